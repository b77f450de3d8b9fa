//! Shared utilities for integration testing: a programmable mock StackIt API.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use stackit_client::config::ClientConfig;
use stackit_client::session::MemorySessionStore;
use stackit_client::ApiClient;

/// Path prefix the mock serves under, mirroring a real deployment.
pub const API_PREFIX: &str = "/api/v1";

/// One request as seen by the mock, path relative to [`API_PREFIX`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn bearer(&self) -> Option<&str> {
        self.authorization.as_deref()?.strip_prefix("Bearer ")
    }
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<RecordedRequest>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn push(&self, request: RecordedRequest) {
        self.0.lock().unwrap().push(request);
    }
}

pub struct MockApi {
    pub addr: SocketAddr,
    pub recorder: Recorder,
}

impl MockApi {
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Client over an in-memory session seeded with the given tokens.
    pub fn client(&self, access: Option<&str>, refresh: Option<&str>) -> (ApiClient, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::with_session(stackit_client::Session {
            access_token: access.map(str::to_string),
            refresh_token: refresh.map(str::to_string),
        }));
        let client = ApiClient::new(&test_config(&self.base_url()), store.clone()).unwrap();
        (client, store)
    }
}

/// Config pointing at `base_url` with fast retries and no system proxy.
pub fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.use_system_proxy = false;
    config.api.timeout_ms = 2_000;
    config.retries.base_delay_ms = 10;
    config
}

/// Wrap `data` in the standard success envelope.
pub fn envelope(data: Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

/// Start a mock API on an ephemeral port. `handler` maps each recorded
/// request to a status and a raw body.
pub async fn start_mock_api<F, Fut>(handler: F) -> MockApi
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorder = Recorder::default();
    let handler = Arc::new(handler);

    let rec = recorder.clone();
    let app = Router::new().fallback(move |request: Request| {
        let rec = rec.clone();
        let handler = handler.clone();
        async move {
            let recorded = record(request).await;
            rec.push(recorded.clone());
            let (status, body) = handler(recorded).await;
            respond(status, body)
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi { addr, recorder }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn record(request: Request) -> RecordedRequest {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path();
    RecordedRequest {
        method: parts.method.to_string(),
        path: path.strip_prefix(API_PREFIX).unwrap_or(path).to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).ok(),
    }
}

fn respond(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], Body::from(body)).into_response()
}
