//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → .env / process environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the signing secret is never rotated at runtime
//! - All fields have defaults except the webhook URL and signing secret
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitConfig, RelayConfig,
    SecurityConfig, SigningConfig, WebhookConfig,
};
pub use validation::{config_warnings, ConfigWarning};
