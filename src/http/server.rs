//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and contact handlers
//! - Wire up middleware (tracing, CORS, request ID, panic recovery)
//! - Build the relay pipeline from configuration
//! - Run the periodic rate-limit purge alongside the listener
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{CorsConfig, RelayConfig};
use crate::contact::SubmissionValidator;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::panic_response;
use crate::lifecycle::startup::StartupError;
use crate::relay::{Relay, WebhookForwarder};
use crate::security::rate_limit::RateLimiter;
use crate::signing::CredentialMinter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub max_body_size: usize,
}

/// HTTP server for the contact relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Build the pipeline and router. Fails when the signing secret or
    /// webhook URL cannot be used.
    pub fn new(config: RelayConfig) -> Result<Self, StartupError> {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let minter = CredentialMinter::new(&config.signing)?;
        let forwarder = WebhookForwarder::new(&config.webhook)?;

        let relay = Relay::new(
            limiter.clone(),
            SubmissionValidator::default(),
            minter,
            forwarder,
        );

        let state = AppState {
            relay: Arc::new(relay),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/contact", post(handlers::contact))
            .with_state(state);
        with_middleware(routes, &config.cors)
    }

    /// Router without a listener, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let purge_interval = self.config.rate_limit.purge_interval();
        let limiter = self.limiter.clone();
        let mut purge_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(purge_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, tracked = limiter.tracked(), "Purged lapsed rate-limit windows");
                        }
                    }
                    _ = purge_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Wrap routes in the middleware stack. Outermost first: request id,
/// tracing span, id propagation, CORS, panic recovery.
fn with_middleware(routes: Router, cors: &CorsConfig) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
        .layer(set_request_id_layer())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
