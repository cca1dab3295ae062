//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /contact request:
//!     → client_ip.rs (first X-Forwarded-For hop, else peer IP, else "unknown")
//!     → rate_limit.rs (per-identity fixed window)
//!     → Pass to validation
//! ```
//!
//! # Design Decisions
//! - X-Forwarded-For is trusted: the relay runs behind a proxy that appends to it
//! - Clients with no resolvable address share the "unknown" bucket
//! - /health is never admission-controlled

pub mod client_ip;
pub mod rate_limit;

pub use client_ip::{resolve_client_identity, UNKNOWN_CLIENT};
pub use rate_limit::{RateLimitDecision, RateLimiter};
