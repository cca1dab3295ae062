//! Delivery of normalized payloads to the downstream webhook.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::WebhookConfig;
use crate::contact::NormalizedPayload;
use crate::signing::Credential;

/// Stand-in for a rejection body that could not be read.
pub const UNREADABLE_BODY: &str = "<unreadable body>";

/// Outcome of a single forward attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Downstream answered with a 2xx status.
    Delivered { status: StatusCode },
    /// Downstream answered with any other status.
    DownstreamRejected { status: StatusCode, body: String },
    /// No HTTP response was obtained (DNS, refused, timeout, TLS).
    TransportFailure { cause: String },
}

impl ForwardOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ForwardOutcome::Delivered { .. })
    }

    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            ForwardOutcome::Delivered { .. } => "delivered",
            ForwardOutcome::DownstreamRejected { .. } => "rejected",
            ForwardOutcome::TransportFailure { .. } => "transport_failure",
        }
    }
}

/// Forwarder for the single configured webhook.
#[derive(Clone)]
pub struct WebhookForwarder {
    client: Client,
    url: Url,
}

impl WebhookForwarder {
    pub fn new(config: &WebhookConfig) -> Result<Self, ForwarderError> {
        let url = Url::parse(config.url.trim())?;
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(5)))
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `payload` once with `credential` as bearer auth.
    pub async fn forward(
        &self,
        payload: &NormalizedPayload,
        credential: &Credential,
    ) -> ForwardOutcome {
        let result = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, credential.bearer())
            .json(payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return ForwardOutcome::TransportFailure {
                    cause: describe_transport_error(&e),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            return ForwardOutcome::Delivered { status };
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| UNREADABLE_BODY.to_string());
        ForwardOutcome::DownstreamRejected { status, body }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "transport"
    };
    format!("{}: {}", kind, e)
}

#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("invalid webhook URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
