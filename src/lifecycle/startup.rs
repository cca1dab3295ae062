//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start the optional metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and exits non-zero
//! - Listener binds last (traffic only when the pipeline is ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{config_warnings, ConfigError, RelayConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::metrics;
use crate::relay::ForwarderError;
use crate::signing::CredentialError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("credential setup failed: {0}")]
    Credential(#[from] CredentialError),

    #[error("webhook setup failed: {0}")]
    Forwarder(#[from] ForwarderError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the relay from a validated config and serve until SIGINT/SIGTERM.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        webhook_timeout_secs = config.webhook.timeout_secs,
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_max_requests = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    for warning in config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;

    let address = server.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
