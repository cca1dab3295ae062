//! Contact Form Relay (v1)
//!
//! Accepts contact-form submissions and relays them to an n8n webhook.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                    CONTACT RELAY                      │
//!                         │                                                       │
//!   POST /contact         │  ┌──────────┐   ┌────────────┐   ┌──────────────┐    │
//!   ──────────────────────┼─▶│   http   │──▶│  security  │──▶│   contact    │    │
//!                         │  │ handlers │   │ identity + │   │  validator   │    │
//!                         │  └──────────┘   │ rate limit │   └──────┬───────┘    │
//!                         │       ▲         └────────────┘          │            │
//!                         │       │                                 ▼            │
//!                         │  ┌──────────┐   ┌────────────┐   ┌──────────────┐    │
//!   { ok, error }         │  │ response │◀──│   relay    │◀──│   signing    │    │
//!   ◀─────────────────────┼──│  mapping │   │ forwarder  │   │ JWT minter   │    │
//!                         │  └──────────┘   └─────┬──────┘   └──────────────┘    │
//!                         │                       │                              │
//!                         └───────────────────────┼──────────────────────────────┘
//!                                                 ▼
//!                                        n8n webhook (Bearer JWT)
//! ```

use std::path::PathBuf;

use clap::Parser;

use contact_relay::config::load_config;
use contact_relay::lifecycle::startup;
use contact_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "contact-relay")]
#[command(about = "Validating, rate-limited relay from a contact form to an n8n webhook", long_about = None)]
struct Args {
    /// Optional TOML config file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // A missing .env is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("contact-relay: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);
    tracing::info!("contact-relay v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
