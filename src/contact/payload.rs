//! Normalized contact payload sent downstream.

use serde::Serialize;
use serde_json::Value;

/// A submission that passed validation, ready to forward.
///
/// Optional fields serialize as explicit `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPayload {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub privacy_consent: bool,
    pub whatsapp_consent: bool,
    pub user_agent: Option<String>,
    pub language: Option<String>,
    /// Client-reported timestamp, passed through untouched apart from trimming.
    pub timestamp: Option<String>,
    /// Resolved client identity.
    pub ip: String,
    /// Server-assigned creation time, RFC 3339 UTC.
    pub created_at: String,
}

/// Request metadata the validator stamps onto the payload.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub identity: String,
    /// `User-Agent` request header, used when the body carries none.
    pub user_agent_header: Option<String>,
}

/// Coerce a loosely typed consent flag.
///
/// Only boolean `true` or a string equal to `"true"` (ASCII case-insensitive)
/// count as consent.
pub fn coerce_consent(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Trimmed string value of a field, or `None` when absent, not a string, or blank.
pub(crate) fn trimmed(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
