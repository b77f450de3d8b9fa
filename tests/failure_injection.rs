//! Failure injection tests: transient failures, client errors, dead hosts.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use stackit_client::{ApiClient, ErrorKind};
use stackit_client::http::NETWORK_ERROR_MESSAGE;
use stackit_client::session::MemorySessionStore;

mod common;

#[tokio::test]
async fn test_retry_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let mock = common::start_mock_api(move |_| {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, common::envelope(json!({ "ok": true })))
            }
        }
    })
    .await;

    let (client, _) = mock.client(None, None);
    let data: Value = client.get("/questions/").await.expect("should succeed on third attempt");

    assert_eq!(data, json!({ "ok": true }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_persistent_5xx_exhausts_attempts() {
    let mock = common::start_mock_api(|_| async { (503, "Service Unavailable".into()) }).await;

    let (client, _) = mock.client(None, None);
    let start = Instant::now();
    let err = client.get::<Value>("/questions/").await.unwrap_err();

    // Two linear delays: 10ms then 20ms.
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(err.status_code(), 503);
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(mock.recorder.hits("GET", "/questions/"), 3);
}

#[tokio::test]
async fn test_network_failure_is_normalized() {
    let addr = common::closed_port().await;
    let config = common::test_config(&format!("http://{addr}/api/v1"));
    let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

    let err = client.get::<Value>("/questions/").await.unwrap_err();

    assert_eq!(err.status_code(), 0);
    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[tokio::test]
async fn test_timeout_is_retried_then_normalized() {
    let mock = common::start_mock_api(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, common::envelope(json!([])))
    })
    .await;
    let mut config = common::test_config(&mock.base_url());
    config.api.timeout_ms = 100;
    let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

    let err = client.get::<Value>("/questions/").await.unwrap_err();

    assert_eq!(err.status_code(), 0);
    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(mock.recorder.hits("GET", "/questions/"), 3);
}

#[tokio::test]
async fn test_timeout_recovers_within_attempt_budget() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let mock = common::start_mock_api(move |_| {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            (200, common::envelope(json!({ "ok": true })))
        }
    })
    .await;
    let mut config = common::test_config(&mock.base_url());
    config.api.timeout_ms = 100;
    let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

    let data: Value = client.get("/questions/").await.unwrap();

    assert_eq!(data["ok"], true);
    assert_eq!(mock.recorder.hits("GET", "/questions/"), 2);
}

#[tokio::test]
async fn test_validation_errors_not_retried() {
    let mock = common::start_mock_api(|_| async {
        (
            400,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": { "title": ["This field is required."] }
            })
            .to_string(),
        )
    })
    .await;

    let (client, _) = mock.client(Some("a"), Some("r"));
    let err = client
        .post::<Value, _>("/questions/", &json!({ "content": "body" }))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "Validation failed");
    assert_eq!(err.field("title"), ["This field is required."]);
    assert_eq!(err.kind(), ErrorKind::ClientError);
    assert_eq!(mock.recorder.hits("POST", "/questions/"), 1);
}

#[tokio::test]
async fn test_not_found_uses_detail_message() {
    let mock = common::start_mock_api(|_| async { (404, json!({ "detail": "Not found." }).to_string()) }).await;

    let (client, _) = mock.client(None, None);
    let err = client.questions().get::<Value>(99).await.unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.message(), "Not found.");
    assert_eq!(mock.recorder.hits("GET", "/questions/99/"), 1);
}

#[tokio::test]
async fn test_success_false_envelope_is_an_error() {
    let mock = common::start_mock_api(|_| async {
        (200, json!({ "success": false, "message": "Already voted" }).to_string())
    })
    .await;

    let (client, _) = mock.client(Some("a"), None);
    let err = client.questions().vote_up(1).await.unwrap_err();

    assert_eq!(err.message(), "Already voted");
    assert_eq!(mock.recorder.hits("POST", "/questions/1/vote_up/"), 1);
}

#[tokio::test]
async fn test_error_serializes_as_envelope() {
    let mock = common::start_mock_api(|_| async { (403, json!({ "detail": "Forbidden" }).to_string()) }).await;

    let (client, _) = mock.client(Some("a"), Some("r"));
    let err = client.questions().feature(3).await.unwrap_err();
    let wire = serde_json::to_value(&err).unwrap();

    assert_eq!(wire["success"], false);
    assert_eq!(wire["message"], "Forbidden");
    assert_eq!(wire["status_code"], 403);
}
