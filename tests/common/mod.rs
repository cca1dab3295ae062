//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use contact_relay::config::RelayConfig;
use contact_relay::http::HttpServer;
use contact_relay::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const TEST_SECRET: &str = "integration-test-secret";

/// A request captured by the mock webhook.
#[derive(Debug, Clone)]
pub struct Received {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: &'static str,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

/// Handle to a running mock downstream.
pub struct MockWebhook {
    pub url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl MockWebhook {
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn record(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> (StatusCode, &'static str) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(Received { headers, body });
    tokio::time::sleep(state.delay).await;
    (state.status, state.reply)
}

/// Start a mock n8n webhook answering every POST with `status` and `reply`.
pub async fn start_mock_webhook(status: u16, reply: &'static str) -> MockWebhook {
    start_mock_webhook_with_delay(status, reply, Duration::ZERO).await
}

/// Same as [`start_mock_webhook`] but waits `delay` before answering.
pub async fn start_mock_webhook_with_delay(
    status: u16,
    reply: &'static str,
    delay: Duration,
) -> MockWebhook {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        reply,
        delay,
        received: received.clone(),
    };
    let app = Router::new()
        .route("/webhook/contact", post(record))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockWebhook {
        url: format!("http://{}/webhook/contact", addr),
        received,
    }
}

/// A URL on which nothing is listening.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook/contact", addr)
}

/// A downstream that answers every request with `500` and a body cut short
/// of its declared `Content-Length`, then closes the connection.
pub async fn start_truncating_webhook() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(answer_truncated(stream));
        }
    });

    format!("http://{}/webhook/contact", addr)
}

async fn answer_truncated(mut stream: TcpStream) {
    // Drain the request so the client sees a response, not a reset.
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        request.extend_from_slice(&buf[..n]);
        if request_complete(&request) {
            break;
        }
    }

    let _ = stream
        .write_all(
            b"HTTP/1.1 500 Internal Server Error\r\n\
              Content-Type: text/plain\r\n\
              Content-Length: 1000\r\n\
              Connection: close\r\n\r\n\
              partial",
        )
        .await;
    let _ = stream.shutdown().await;
}

fn request_complete(request: &[u8]) -> bool {
    let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= end + 4 + length
}

/// Running relay under test.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay on an ephemeral port, forwarding to `webhook_url`.
pub async fn start_relay(webhook_url: &str, tweak: impl FnOnce(&mut RelayConfig)) -> TestRelay {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.webhook.url = webhook_url.to_string();
    config.webhook.timeout_secs = 2;
    config.signing.secret = TEST_SECRET.to_string();
    tweak(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay { addr, shutdown }
}

/// A submission that passes validation.
pub fn valid_submission() -> Value {
    json!({
        "name": "  Grace Hopper  ",
        "email": "grace@example.com",
        "subject": "Compilers",
        "message": "It's easier to ask forgiveness than it is to get permission.",
        "privacyConsent": "true",
        "language": "en-US"
    })
}
