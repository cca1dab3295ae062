//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the TraceLayer span
//! - Downstream failure detail is logged, never returned to callers
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
