//! Request orchestration: identity → admission → validation → credential → forward.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::contact::{join_issues, ClientContext, SubmissionValidator, ValidationResult};
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::forwarder::{ForwardOutcome, WebhookForwarder};
use crate::security::client_ip::resolve_client_identity;
use crate::security::rate_limit::{RateLimitDecision, RateLimiter};
use crate::signing::CredentialMinter;

/// What the HTTP layer hands the pipeline for one admitted `/contact` call.
#[derive(Debug, Clone)]
pub struct ContactRequest {
    /// Identity returned by [`Relay::admit`].
    pub identity: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Successful delivery receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub identity: String,
}

/// The validate → authorize → forward pipeline.
pub struct Relay {
    limiter: Arc<RateLimiter>,
    validator: SubmissionValidator,
    minter: CredentialMinter,
    forwarder: WebhookForwarder,
}

impl Relay {
    pub fn new(
        limiter: Arc<RateLimiter>,
        validator: SubmissionValidator,
        minter: CredentialMinter,
        forwarder: WebhookForwarder,
    ) -> Self {
        Self {
            limiter,
            validator,
            minter,
            forwarder,
        }
    }

    /// Resolve the caller's identity and count the request against its quota.
    ///
    /// Runs before the body is read, so every inbound request is counted once
    /// whatever its body turns out to be.
    pub fn admit(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Result<String, RelayError> {
        let identity = resolve_client_identity(headers, peer);

        match self.limiter.check(&identity) {
            RateLimitDecision::Admitted { .. } => Ok(identity),
            RateLimitDecision::Denied { retry_after } => {
                warn!(client = %identity, ?retry_after, "Rate limit exceeded");
                metrics::record_rate_limited();
                Err(RelayError::RateLimited {
                    identity,
                    retry_after,
                    limit: self.limiter.max_requests(),
                })
            }
        }
    }

    /// Run an admitted request through validation, signing and delivery.
    pub async fn handle(&self, request: ContactRequest) -> Result<Delivered, RelayError> {
        let ContactRequest {
            identity,
            headers,
            body,
        } = request;

        let body: Value = serde_json::from_slice(&body).map_err(|e| {
            info!(client = %identity, error = %e, "Rejected unparseable body");
            metrics::record_validation_failure("malformed_body");
            RelayError::from(e)
        })?;

        let ctx = ClientContext {
            user_agent_header: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            identity: identity.clone(),
        };

        let payload = match self.validator.validate(&body, &ctx) {
            ValidationResult::Valid(payload) => payload,
            ValidationResult::Invalid(issues) => {
                info!(client = %identity, reasons = %join_issues(&issues), "Submission rejected");
                for issue in &issues {
                    metrics::record_validation_failure(issue.kind());
                }
                return Err(RelayError::Invalid(issues));
            }
        };

        let credential = self.minter.mint().map_err(|e| {
            error!(client = %identity, error = %e, "Failed to mint credential");
            RelayError::from(e)
        })?;

        let started = Instant::now();
        let outcome = self.forwarder.forward(&payload, &credential).await;
        metrics::record_forward(outcome.label(), started);

        match &outcome {
            ForwardOutcome::Delivered { status } => {
                debug!(client = %identity, %status, elapsed = ?started.elapsed(), "Submission delivered");
                return Ok(Delivered { identity });
            }
            ForwardOutcome::DownstreamRejected { status, body } => {
                error!(client = %identity, %status, body = %body, "Downstream rejected submission");
            }
            ForwardOutcome::TransportFailure { cause } => {
                error!(
                    client = %identity,
                    url = %self.forwarder.url(),
                    cause = %cause,
                    "Downstream unreachable"
                );
            }
        }

        Err(RelayError::Downstream(outcome))
    }
}
