//! End-to-end tests for the contact relay against a mock webhook.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use sdk_rust::{ContactForm, RelayClient};
use serde_json::{json, Value};

use contact_relay::signing::Claims;

mod common;

#[tokio::test]
async fn test_valid_submission_is_delivered_with_bearer_jwt() {
    let webhook = common::start_mock_webhook(200, r#"{"received":true}"#).await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    let res = client
        .submit_json(&common::valid_submission(), Some("203.0.113.50"))
        .await
        .expect("relay unreachable");

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.reply.ok);
    assert_eq!(res.reply.error, None);
    assert!(res.request_id.is_some());

    let received = webhook.received();
    assert_eq!(received.len(), 1);
    let call = &received[0];

    assert_eq!(call.headers["content-type"], "application/json");
    let auth = call.headers["authorization"].to_str().unwrap();
    let token = auth.strip_prefix("Bearer ").expect("bearer scheme");
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(common::TEST_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("token verifies with the shared secret")
    .claims;
    assert_eq!(claims.exp - claims.iat, 300);

    let body = &call.body;
    assert_eq!(body["name"], "Grace Hopper");
    assert_eq!(body["privacyConsent"], true);
    assert_eq!(body["whatsappConsent"], false);
    assert_eq!(body["language"], "en-US");
    assert_eq!(body["ip"], "203.0.113.50");
    assert!(body["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_unset_optionals_arrive_as_explicit_null() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    let res = client
        .submit_json(&common::valid_submission(), None)
        .await
        .unwrap();
    assert_eq!(res.status, StatusCode::OK);

    let body = webhook.received().remove(0).body;
    let object = body.as_object().unwrap();
    for key in ["company", "phone", "timestamp"] {
        assert_eq!(object.get(key), Some(&Value::Null), "{} must be present and null", key);
    }
    // No User-Agent header and no body field.
    assert_eq!(object.get("userAgent"), Some(&Value::Null));
    assert_eq!(body["ip"], "127.0.0.1");
}

#[tokio::test]
async fn test_typed_form_through_sdk() {
    let webhook = common::start_mock_webhook(204, "").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    let form = ContactForm {
        name: "Alan".into(),
        email: "alan@example.com".into(),
        subject: "Machines".into(),
        message: "Can machines think?".into(),
        company: Some(" Bletchley ".into()),
        privacy_consent: true,
        whatsapp_consent: Some(true),
        user_agent: Some("ContactWidget/1.4".into()),
        ..Default::default()
    };
    let res = client.submit(&form).await.unwrap();
    assert_eq!(res.status, StatusCode::OK);

    let body = webhook.received().remove(0).body;
    assert_eq!(body["company"], "Bletchley");
    assert_eq!(body["whatsappConsent"], true);
    assert_eq!(body["userAgent"], "ContactWidget/1.4");
}

#[tokio::test]
async fn test_validation_failure_never_reaches_webhook() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    let res = client
        .submit_json(&json!({ "email": "x@example.com", "privacyConsent": 1 }), None)
        .await
        .unwrap();

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(!res.reply.ok);
    assert_eq!(
        res.reply.error.as_deref(),
        Some("Name is required, Subject is required, Message is required, Privacy consent is required")
    );
    assert!(webhook.received().is_empty());
}

#[tokio::test]
async fn test_honeypot_reports_only_spam() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    let res = client
        .submit_json(&json!({ "honeypot": "http://spam.example" }), None)
        .await
        .unwrap();

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.reply.error.as_deref(), Some("spam detected"));
    assert!(webhook.received().is_empty());
}

#[tokio::test]
async fn test_fourth_request_is_rate_limited_and_skips_validation() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());
    let ip = Some("198.51.100.77");

    for _ in 0..3 {
        let res = client.submit_json(&common::valid_submission(), ip).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
    }

    // An invalid body would be a 400 if it reached the validator.
    let res = client.submit_json(&json!({}), ip).await.unwrap();
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        res.reply.error.as_deref(),
        Some("Too many requests, please try again later")
    );
    let retry_after = res.retry_after.expect("Retry-After header");
    assert!((1..=60).contains(&retry_after));
    assert_eq!(webhook.received().len(), 3);
}

#[tokio::test]
async fn test_identities_have_independent_quotas() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    for _ in 0..3 {
        client.submit_json(&json!({}), Some("192.0.2.1")).await.unwrap();
    }
    let res = client.submit_json(&json!({}), Some("192.0.2.1")).await.unwrap();
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    let res = client
        .submit_json(&common::valid_submission(), Some("192.0.2.2"))
        .await
        .unwrap();
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_unaffected_by_exhausted_quota() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |_| {}).await;
    let client = RelayClient::new(&relay.url());

    for _ in 0..4 {
        client.submit_json(&json!({}), None).await.unwrap();
    }
    let res = client.submit_json(&json!({}), None).await.unwrap();
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    for _ in 0..5 {
        let res = client.health().await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.reply.ok);
    }
}

#[tokio::test]
async fn test_configured_limit_is_honoured() {
    let webhook = common::start_mock_webhook(200, "ok").await;
    let relay = common::start_relay(&webhook.url, |config| {
        config.rate_limit.max_requests = 1;
    })
    .await;
    let client = RelayClient::new(&relay.url());

    let first = client.submit_json(&common::valid_submission(), None).await.unwrap();
    let second = client.submit_json(&common::valid_submission(), None).await.unwrap();
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
}
