use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Fields a contact form posts to the relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honeypot: Option<String>,
    pub privacy_consent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_consent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// `{ ok, error }` body returned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Status, headers of interest and body of a relay call.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub retry_after: Option<u64>,
    pub request_id: Option<String>,
    pub reply: RelayReply,
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::builder()
                .pool_max_idle_per_host(0)
                .no_proxy()
                .build()
                .unwrap_or_default(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<RelayResponse, reqwest::Error> {
        let resp = self
            .client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?;
        Self::read(resp).await
    }

    /// Submit a typed contact form.
    pub async fn submit(&self, form: &ContactForm) -> Result<RelayResponse, reqwest::Error> {
        self.submit_json(&serde_json::to_value(form).unwrap_or_default(), None)
            .await
    }

    /// Submit an arbitrary JSON body, optionally as a given forwarded client.
    pub async fn submit_json(
        &self,
        body: &serde_json::Value,
        forwarded_for: Option<&str>,
    ) -> Result<RelayResponse, reqwest::Error> {
        let mut req = self
            .client
            .post(format!("{}/contact", self.relay_url))
            .json(body);
        if let Some(ip) = forwarded_for {
            req = req.header("X-Forwarded-For", ip);
        }
        Self::read(req.send().await?).await
    }

    async fn read(resp: reqwest::Response) -> Result<RelayResponse, reqwest::Error> {
        let status = resp.status();
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let retry_after = header("retry-after").and_then(|v| v.parse().ok());
        let request_id = header("x-request-id");
        let reply = resp.json::<RelayReply>().await?;

        Ok(RelayResponse {
            status,
            retry_after,
            request_id,
            reply,
        })
    }
}
