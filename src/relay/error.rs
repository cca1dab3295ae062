//! Pipeline error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::contact::{join_issues, ValidationIssue};
use crate::relay::forwarder::ForwardOutcome;
use crate::signing::CredentialError;

/// Every way a contact request can end without a delivery.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Admission control denied the request.
    #[error("rate limit exceeded for {identity}, retry in {retry_after:?}")]
    RateLimited {
        identity: String,
        retry_after: Duration,
        limit: u32,
    },

    /// The body was not parseable JSON.
    #[error("malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The submission failed validation.
    #[error("{}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),

    /// Downstream rejected the payload or could not be reached.
    #[error("downstream {}: {}", .0.label(), describe(.0))]
    Downstream(ForwardOutcome),

    /// Unexpected internal fault.
    #[error("internal fault: {0}")]
    Credential(#[from] CredentialError),
}

fn describe(outcome: &ForwardOutcome) -> String {
    match outcome {
        ForwardOutcome::Delivered { status } => status.to_string(),
        ForwardOutcome::DownstreamRejected { status, body } => format!("{} {}", status, body),
        ForwardOutcome::TransportFailure { cause } => cause.clone(),
    }
}

impl RelayError {
    /// True for faults on the relay's side rather than the caller's.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, RelayError::Downstream(_) | RelayError::Credential(_))
    }
}
