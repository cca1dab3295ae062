//! Per-client admission control.
//!
//! Each identity gets a fixed window that opens on its first request and
//! admits at most `max_requests` calls until it lapses. The next request
//! after the window lapses opens a fresh one.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request may proceed.
    Admitted {
        /// Requests still available in the current window.
        remaining: u32,
    },
    /// Quota exhausted for the current window.
    Denied {
        /// Time until the window lapses.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RateLimitDecision::Admitted { .. })
    }
}

/// Window state for one identity.
#[derive(Debug)]
struct Window {
    started: Instant,
    admitted: u32,
}

/// Rate limiter keyed by client identity.
///
/// `DashMap::entry` holds the shard lock for the duration of a check, so the
/// read-modify-write of a single identity's counter is atomic.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            window: config.window(),
            max_requests: config.max_requests,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Check and count a request for `identity`.
    pub fn check(&self, identity: &str) -> RateLimitDecision {
        self.check_at(identity, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, identity: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| Window {
                started: now,
                admitted: 0,
            });
        let state = entry.value_mut();

        let elapsed = now.saturating_duration_since(state.started);
        if elapsed >= self.window {
            state.started = now;
            state.admitted = 0;
        }

        if state.admitted < self.max_requests {
            state.admitted += 1;
            RateLimitDecision::Admitted {
                remaining: self.max_requests - state.admitted,
            }
        } else {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(state.started));
            RateLimitDecision::Denied { retry_after }
        }
    }

    /// Drop windows that have lapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        let removed = before.saturating_sub(self.windows.len());
        metrics::record_tracked_clients(self.windows.len());
        removed
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}
