//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the webhook URL and signing secret are present
//! - Validate value ranges (timeouts > 0, window > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Accepted-but-risky settings come back as `ConfigWarning` data; nothing
//!   here logs, since validation runs before the subscriber is installed
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("webhook URL is not set (N8N_WEBHOOK_URL)")]
    MissingWebhookUrl,

    #[error("webhook URL {url:?} is invalid: {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("signing secret is not set (N8N_JWT_SECRET)")]
    MissingSigningSecret,

    #[error("bind address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// A setting that is accepted but worth flagging at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("webhook URL {url:?} is not HTTPS; credentials travel in clear text")]
    InsecureWebhook { url: String },
}

/// Settings that pass validation but should be logged once logging is up.
pub fn config_warnings(config: &RelayConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let url = config.webhook.url.trim();
    if let Ok(parsed) = Url::parse(url) {
        if parsed.scheme() == "http" {
            warnings.push(ConfigWarning::InsecureWebhook {
                url: url.to_string(),
            });
        }
    }

    warnings
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let url = config.webhook.url.trim();
    if url.is_empty() {
        errors.push(ValidationError::MissingWebhookUrl);
    } else {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError::InvalidWebhookUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidWebhookUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if config.signing.secret.is_empty() {
        errors.push(ValidationError::MissingSigningSecret);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let ranges = [
        ("webhook.timeout_secs", config.webhook.timeout_secs),
        ("signing.token_ttl_secs", config.signing.token_ttl_secs),
        ("rate_limit.window_secs", config.rate_limit.window_secs),
        ("rate_limit.max_requests", u64::from(config.rate_limit.max_requests)),
        ("rate_limit.purge_interval_secs", config.rate_limit.purge_interval_secs),
    ];
    for (field, value) in ranges {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
