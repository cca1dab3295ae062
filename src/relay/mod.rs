//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! headers + peer (Relay::admit, before the body is read)
//!     → security::client_ip (identity)
//!     → security::rate_limit (Denied → RelayError::RateLimited)
//! ContactRequest (Relay::handle)
//!     → contact::validator (Invalid → RelayError::Invalid)
//!     → signing::minter (Err → RelayError::Credential)
//!     → forwarder.rs (one POST, no retry)
//!     → Delivered | RelayError::Downstream
//! ```
//!
//! # Design Decisions
//! - Linear pipeline; every request ends in bounded steps
//! - Components return structured outcomes; `RelayError` is the single
//!   type the HTTP layer maps to responses
//! - Downstream causes are logged here and never returned to the caller

pub mod error;
pub mod forwarder;
pub mod pipeline;

pub use error::RelayError;
pub use forwarder::{ForwardOutcome, ForwarderError, WebhookForwarder};
pub use pipeline::{ContactRequest, Delivered, Relay};
