//! Resilient API client.
//!
//! # Responsibilities
//! - Attach the bearer credential held by the session store
//! - Dispatch with a per-attempt timeout
//! - On 401, refresh the session once per logical request and replay
//! - Retry network failures and 5xx with linear backoff
//! - Normalize responses (envelope or bare) and errors
//!
//! # State Machine (per logical request)
//! ```text
//! INITIATED → DISPATCH → SUCCESS
//!                      → NEEDS_REFRESH → REFRESHING → REPLAY (DISPATCH) | FAILED
//!                      → NEEDS_RETRY   → sleep(attempt × base) → DISPATCH | FAILED
//!                      → FAILED
//! ```

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::Instrument;
use url::Url;

use crate::config::validation::validate_config;
use crate::config::{ClientConfig, ConfigError, SessionStorage};
use crate::http::error::{ApiError, ErrorKind, TransportError};
use crate::http::request::{AttemptContext, RequestDescriptor, REQUEST_ID_HEADER};
use crate::http::response::decode_payload;
use crate::observability::metrics;
use crate::resilience::{RefreshGate, RefreshOutcome, RetryPolicy};
use crate::session::{
    AuthTokens, FileSessionStore, MemorySessionStore, SessionEvent, SessionStore,
};

/// Capacity of the session event channel; slow subscribers lose old events.
const EVENT_CAPACITY: usize = 16;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the server rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    refresh_path: String,
    retry: RetryPolicy,
    session: Arc<dyn SessionStore>,
    refresh_gate: RefreshGate,
    events: broadcast::Sender<SessionEvent>,
}

/// HTTP client for the StackIt API.
///
/// Cheap to clone; clones share the connection pool, session store and
/// refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a client over an explicitly provided session store.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(config.api.timeout())
            .connect_timeout(config.api.connect_timeout())
            .user_agent(config.api.user_agent.clone())
            .default_headers(headers);
        if !config.api.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tracing::debug!(
            base_url = %config.api.base_url,
            timeout_ms = config.api.timeout_ms,
            max_attempts = config.retries.max_attempts,
            "API client initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.api.base_url.trim_end_matches('/').to_string(),
                refresh_path: config.api.refresh_path.clone(),
                retry: RetryPolicy::from(&config.retries),
                session,
                refresh_gate: RefreshGate::new(),
                events,
            }),
        })
    }

    /// Create a client with the session store selected by `config.session`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let session: Arc<dyn SessionStore> = match config.session.storage {
            SessionStorage::Memory => Arc::new(MemorySessionStore::new()),
            SessionStorage::File => Arc::new(FileSessionStore::open(&config.session.path)?),
        };
        Self::new(config, session)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.inner.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// Receive session lifecycle events. `Expired` means the user must sign in again.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Store a fresh token pair (login, registration).
    pub(crate) fn store_tokens(&self, tokens: AuthTokens) {
        if let Err(e) = self.inner.session.set_tokens(tokens) {
            tracing::warn!(error = %e, "Failed to persist session tokens");
        }
        self.emit(SessionEvent::LoggedIn);
    }

    /// Drop both tokens locally.
    pub(crate) fn clear_session(&self, event: SessionEvent) {
        if let Err(e) = self.inner.session.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
        self.emit(event);
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::get(path)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(RequestDescriptor::post(path).json(body)?).await
    }

    /// POST without a body, for action endpoints such as `vote_up/`.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::post(path)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(RequestDescriptor::put(path).json(body)?).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::delete(path)).await
    }

    /// Perform a request and decode the inner payload as `T`.
    pub async fn request<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T, ApiError> {
        let span = tracing::info_span!(
            "api_request",
            method = %request.method(),
            path = %request.path(),
            request_id = %request.request_id(),
        );
        self.execute(&request).instrument(span).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T, ApiError> {
        let url = request.url(&self.inner.base_url)?;
        let mut ctx = AttemptContext::first();

        loop {
            let token = self.inner.session.access_token();

            match self.dispatch(request, &url, token.as_deref(), ctx).await {
                Ok((status, body)) => return decode_payload(status, &body),

                Err(err) if err.is_unauthorized() => {
                    if ctx.refresh_attempted {
                        tracing::warn!("Unauthorized after session refresh");
                        return Err(err.into());
                    }
                    if self.inner.session.refresh_token().is_none() {
                        tracing::debug!("Unauthorized and no refresh token held");
                        return Err(err.into());
                    }
                    self.refresh_session(token.as_deref()).await?;
                    ctx = ctx.after_refresh();
                }

                Err(TransportError::Malformed(message)) => {
                    tracing::error!(error = %message, "Request could not be built");
                    return Err(ApiError::malformed(message));
                }

                Err(err) if self.inner.retry.should_retry(ctx.attempt, err.status()) => {
                    let delay = self.inner.retry.delay(ctx.attempt);
                    tracing::info!(
                        attempt = ctx.attempt,
                        max_attempts = self.inner.retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        reason = %err.label(),
                        "Retrying request"
                    );
                    metrics::record_retry(request.method().as_str(), &err.label());
                    tokio::time::sleep(delay).await;
                    ctx = ctx.next_attempt();
                }

                Err(err) => {
                    tracing::warn!(attempt = ctx.attempt, reason = %err.label(), "Request failed");
                    return Err(err.into());
                }
            }
        }
    }

    /// One dispatch. Non-2xx statuses come back as `TransportError::Status`.
    async fn dispatch(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        token: Option<&str>,
        ctx: AttemptContext,
    ) -> Result<(StatusCode, Vec<u8>), TransportError> {
        let start = Instant::now();
        let method = request.method().clone();

        let mut builder = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .headers(request.headers().clone())
            .header(REQUEST_ID_HEADER, request.request_id().to_string());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout_override() {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(
            attempt = ctx.attempt,
            authenticated = token.is_some(),
            "Dispatching request"
        );

        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, TransportError>((status, body.to_vec()))
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok((status, _)) => {
                metrics::record_request(method.as_str(), status.as_str(), start);
                tracing::info!(status = status.as_u16(), duration_ms, attempt = ctx.attempt, "API response");
            }
            Err(err) => {
                metrics::record_request(method.as_str(), &err.label(), start);
                tracing::warn!(error = %err, duration_ms, attempt = ctx.attempt, "API call failed");
            }
        }

        let (status, body) = result?;
        if status.is_success() {
            Ok((status, body))
        } else {
            Err(TransportError::Status { status, body })
        }
    }

    /// Obtain a new access token for a request that was sent with `stale`.
    async fn refresh_session(&self, stale: Option<&str>) -> Result<(), ApiError> {
        let outcome = self
            .inner
            .refresh_gate
            .run(self.inner.session.as_ref(), stale, || self.refresh_or_expire())
            .await;

        match outcome {
            Ok(RefreshOutcome::Refreshed(_)) => {
                metrics::record_refresh("refreshed");
                tracing::info!("Session refreshed, replaying request");
                Ok(())
            }
            Ok(RefreshOutcome::Shared(_)) => {
                metrics::record_refresh("shared");
                tracing::debug!("Replaying request with concurrently refreshed token");
                Ok(())
            }
            Err(err) => {
                metrics::record_refresh("failed");
                Err(err)
            }
        }
    }

    /// Run the refresh call; on failure clear the session before the gate opens.
    async fn refresh_or_expire(&self) -> Result<String, ApiError> {
        match self.call_refresh_endpoint().await {
            Ok(access) => {
                self.emit(SessionEvent::Refreshed);
                Ok(access)
            }
            Err(err) => {
                tracing::warn!(
                    status_code = err.status_code(),
                    error = %err,
                    "Session refresh failed, clearing tokens"
                );
                self.clear_session(SessionEvent::Expired);
                Err(err.with_kind(ErrorKind::AuthExpired))
            }
        }
    }

    /// Unauthenticated POST of the refresh token; stores the result.
    async fn call_refresh_endpoint(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.inner.session.refresh_token() else {
            return Err(ApiError::new("Session expired. Please sign in again.", 401));
        };

        let request = RequestDescriptor::post(self.inner.refresh_path.as_str());
        let url = request.url(&self.inner.base_url)?;
        let start = Instant::now();

        let result = async {
            let response = self
                .inner
                .http
                .post(url)
                .header(REQUEST_ID_HEADER, request.request_id().to_string())
                .json(&RefreshRequest { refresh: &refresh })
                .send()
                .await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, TransportError>((status, body.to_vec()))
        }
        .await;

        let (status, body) = match result {
            Ok(ok) => ok,
            Err(err) => {
                metrics::record_request("POST", &err.label(), start);
                return Err(err.into());
            }
        };
        metrics::record_request("POST", status.as_str(), start);

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        let tokens: RefreshResponse = decode_payload(status, &body)?;
        let stored = match tokens.refresh {
            Some(rotated) => self.inner.session.set_tokens(AuthTokens {
                access: tokens.access.clone(),
                refresh: rotated,
            }),
            None => self.inner.session.set_access_token(tokens.access.clone()),
        };
        if let Err(e) = stored {
            tracing::warn!(error = %e, "Refreshed token could not be persisted");
        }

        Ok(tokens.access)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("retry", &self.inner.retry)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
