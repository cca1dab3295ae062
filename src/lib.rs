//! Contact Form Relay Library
//!
//! Validates contact-form submissions, applies per-client rate limiting,
//! signs a short-lived credential, and forwards the normalized payload to a
//! single n8n webhook.

pub mod config;
pub mod contact;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;
pub mod signing;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
