//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID v4 `x-request-id` to requests that arrive without one
//! - Echo the id on the response
//! - Expose the id to handlers for log correlation
//! - Open the per-request span that carries the id into every log line

use axum::http::{HeaderName, Request};
use tracing::Span;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that generates missing request ids.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Access the request id assigned by [`set_request_id_layer`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Span for one request. Used as the `TraceLayer` span maker, inside the
/// layer that assigns the id.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request.request_id(),
    )
}
