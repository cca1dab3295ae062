//! HTTP handlers for the relay endpoints.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, warn};

use crate::http::request::RequestIdExt;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::{ContactRequest, Delivered, RelayError};

pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload too large";

/// Liveness probe. Never rate limited.
pub async fn health() -> Json<ApiResponse> {
    Json(ApiResponse::ok())
}

/// Validate a contact submission and relay it downstream.
pub async fn contact(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();

    let response = match state.relay.admit(&parts.headers, peer) {
        Ok(identity) => match to_bytes(body, state.max_body_size).await {
            Ok(body) => {
                let outcome = state
                    .relay
                    .handle(ContactRequest {
                        identity,
                        headers: parts.headers,
                        body,
                    })
                    .await;
                relay_response(&request_id, outcome)
            }
            Err(e) => {
                warn!(request_id = %request_id, client = %identity, error = %e, "Failed to read request body");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(ApiResponse::error(PAYLOAD_TOO_LARGE_MESSAGE)),
                )
                    .into_response()
            }
        },
        Err(e) => e.into_response(),
    };

    metrics::record_request("/contact", response.status().as_u16(), start);
    response
}

fn relay_response(request_id: &str, outcome: Result<Delivered, RelayError>) -> Response {
    match outcome {
        Ok(delivered) => {
            debug!(request_id = %request_id, client = %delivered.identity, "Contact relayed");
            (StatusCode::OK, Json(ApiResponse::ok())).into_response()
        }
        Err(e) if e.is_server_fault() => {
            error!(request_id = %request_id, error = %e, "Contact not relayed");
            e.into_response()
        }
        Err(e) => {
            debug!(request_id = %request_id, error = %e, "Contact not relayed");
            e.into_response()
        }
    }
}
