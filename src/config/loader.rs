//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_WEBHOOK_URL: &str = "N8N_WEBHOOK_URL";
pub const ENV_JWT_SECRET: &str = "N8N_JWT_SECRET";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the process
/// environment, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_WEBHOOK_URL) {
        config.webhook.url = url.trim().to_string();
    }

    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        config.signing.secret = secret;
    }

    if let Some(port) = lookup(ENV_PORT) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: ENV_PORT,
            value: port.clone(),
        })?;
        config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
            Ok(mut addr) => {
                addr.set_port(port);
                addr.to_string()
            }
            Err(_) => format!("0.0.0.0:{}", port),
        };
    }

    if let Some(origins) = lookup(ENV_ALLOWED_ORIGINS) {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(())
}
