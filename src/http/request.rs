//! Outbound request description.
//!
//! A [`RequestDescriptor`] is immutable once built; everything that changes
//! between attempts lives in [`AttemptContext`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::http::error::ApiError;

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What to send: method, path relative to the base URL, query, headers, body.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Value>,
    timeout: Option<Duration>,
    request_id: Uuid,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one query parameter. Repeated keys are kept in order.
    pub fn query_pair(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body that is already a value.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize and attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::malformed(format!("Request body could not be encoded: {e}")))?;
        Ok(self.body(value))
    }

    /// Override the client-wide timeout for each attempt of this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Correlation ID shared by every attempt of this request.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Resolve the full URL against `base`.
    ///
    /// The path is appended to the base path, never resolved relative to it,
    /// so `/questions/` under `http://host/api/v1` stays under `/api/v1`.
    pub fn url(&self, base: &str) -> Result<Url, ApiError> {
        let base = base.trim_end_matches('/');
        let joined = if self.path.starts_with('/') {
            format!("{base}{}", self.path)
        } else {
            format!("{base}/{}", self.path)
        };

        let mut url = Url::parse(&joined)
            .map_err(|e| ApiError::malformed(format!("Invalid request URL '{joined}': {e}")))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}

/// Mutable per-call state threaded through dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptContext {
    /// 1-based number of the dispatch about to happen (or that just failed).
    pub attempt: u32,
    /// Set once a 401 triggered a refresh for this logical request.
    pub refresh_attempted: bool,
}

impl AttemptContext {
    pub fn first() -> Self {
        Self {
            attempt: 1,
            refresh_attempted: false,
        }
    }

    pub fn next_attempt(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }

    /// Replay after refresh. Does not consume a retry attempt.
    pub fn after_refresh(self) -> Self {
        Self {
            refresh_attempted: true,
            ..self
        }
    }
}

impl Default for AttemptContext {
    fn default() -> Self {
        Self::first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000/api/v1";

    #[test]
    fn path_is_appended_to_base_path() {
        let url = RequestDescriptor::get("/questions/").url(BASE).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/questions/");

        let url = RequestDescriptor::get("tags/").url(&format!("{BASE}/")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/tags/");
    }

    #[test]
    fn inline_query_and_pairs_combine() {
        let url = RequestDescriptor::get("/answers/?question=5")
            .query_pair("ordering", "-votes")
            .url(BASE)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/answers/?question=5&ordering=-votes"
        );
    }

    #[test]
    fn repeated_keys_are_preserved() {
        let url = RequestDescriptor::get("/questions/")
            .query([("tags", 1), ("tags", 2)])
            .url(BASE)
            .unwrap();
        assert_eq!(url.query(), Some("tags=1&tags=2"));
    }

    #[test]
    fn bad_base_is_malformed() {
        let err = RequestDescriptor::get("/questions/").url("not a url").unwrap_err();
        assert_eq!(err.status_code(), 0);
        assert!(err.message().starts_with("Invalid request URL"));
    }

    #[test]
    fn clones_share_request_id() {
        let request = RequestDescriptor::post("/questions/");
        assert_eq!(request.clone().request_id(), request.request_id());
    }

    #[test]
    fn refresh_replay_keeps_attempt_number() {
        let ctx = AttemptContext::first().next_attempt().after_refresh();
        assert_eq!(ctx.attempt, 2);
        assert!(ctx.refresh_attempted);
        assert!(ctx.next_attempt().refresh_attempted);
    }
}
