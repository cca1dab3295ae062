//! Response contract.
//!
//! # Responsibilities
//! - Shape every JSON body as `{ ok, error? }`
//! - Map `RelayError` to status codes and caller-safe messages
//! - Attach retry headers to rate-limit denials
//!
//! # Design Decisions
//! - Downstream and internal faults share opaque messages; detail stays in logs

use std::any::Any;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::contact::join_issues;
use crate::relay::RelayError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later";
pub const DOWNSTREAM_MESSAGE: &str = "n8n error";
pub const SERVER_ERROR_MESSAGE: &str = "Server error";
pub const MALFORMED_BODY_MESSAGE: &str = "Invalid JSON body";

/// JSON body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::RateLimited {
                retry_after, limit, ..
            } => {
                // Round up so clients never retry before the window lapses.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ApiResponse::error(RATE_LIMITED_MESSAGE)),
                )
                    .into_response();
                let headers = response.headers_mut();
                headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(secs));
                headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(limit));
                headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(0u32));
                headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from(secs));
                response
            }
            RelayError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(MALFORMED_BODY_MESSAGE)),
            )
                .into_response(),
            RelayError::Invalid(issues) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(join_issues(&issues))),
            )
                .into_response(),
            RelayError::Downstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(DOWNSTREAM_MESSAGE)),
            )
                .into_response(),
            RelayError::Credential(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(SERVER_ERROR_MESSAGE)),
            )
                .into_response(),
        }
    }
}

/// Response for a handler that panicked. Installed through `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("<non-string panic>");
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(SERVER_ERROR_MESSAGE)),
    )
        .into_response()
}
