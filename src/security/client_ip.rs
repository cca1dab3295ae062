//! Client identity resolution.
//!
//! The relay is assumed to sit behind a reverse proxy that appends to
//! `X-Forwarded-For`, so the first hop in that header is trusted as the
//! original client address.

use std::net::SocketAddr;

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity shared by every client whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate-limit identity for a request.
pub fn resolve_client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}
