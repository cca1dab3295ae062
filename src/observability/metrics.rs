//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by route, status
//! - `relay_request_duration_seconds` (histogram): handler latency by route
//! - `relay_rate_limited_total` (counter): admission denials
//! - `relay_validation_failures_total` (counter): rejected submissions by reason kind
//! - `relay_forward_total` (counter): forward attempts by outcome
//! - `relay_forward_duration_seconds` (histogram): downstream latency
//! - `relay_tracked_clients` (gauge): identities with a live window
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!("relay_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    histogram!("relay_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("relay_rate_limited_total").increment(1);
}

pub fn record_validation_failure(kind: &'static str) {
    counter!("relay_validation_failures_total", "kind" => kind).increment(1);
}

pub fn record_forward(outcome: &'static str, start: Instant) {
    counter!("relay_forward_total", "outcome" => outcome).increment(1);
    histogram!("relay_forward_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_tracked_clients(count: usize) {
    gauge!("relay_tracked_clients").set(count as f64);
}
