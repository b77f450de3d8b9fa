//! Error normalization.
//!
//! Every failure leaving the client is an [`ApiError`], shaped like the
//! server's own error envelope:
//!
//! ```text
//! { "success": false, "message": "...", "errors": { field: [msg, ...] } | null, "status_code": 400 }
//! ```
//!
//! Transport-level failures are captured as [`TransportError`] inside the
//! client and converted at the boundary.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Field name → validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message used whenever no response was received.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Coarse classification of a surfaced failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    /// 401 with no viable refresh path; the session is gone.
    AuthExpired,
    /// Any other 4xx. Never retried.
    ClientError,
    /// Network failure or 5xx that outlived the retry budget.
    Unavailable,
    /// Local failure: bad URL, unencodable body, undecodable response.
    #[default]
    Malformed,
}

impl ErrorKind {
    /// Classify by status code; 0 means no response.
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            0 => Self::Unavailable,
            401 => Self::AuthExpired,
            500..=599 => Self::Unavailable,
            _ => Self::ClientError,
        }
    }
}

/// Normalized error returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
#[serde(into = "ErrorEnvelope")]
pub struct ApiError {
    message: String,
    errors: Option<FieldErrors>,
    status_code: u16,
    kind: ErrorKind,
}

/// Wire form of [`ApiError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub errors: Option<FieldErrors>,
    pub status_code: u16,
}

impl From<ApiError> for ErrorEnvelope {
    fn from(err: ApiError) -> Self {
        Self {
            success: false,
            message: err.message,
            errors: err.errors,
            status_code: err.status_code,
        }
    }
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            errors: None,
            status_code,
            kind: ErrorKind::from_status(status_code),
        }
    }

    /// No response was received.
    pub fn network() -> Self {
        Self::new(NETWORK_ERROR_MESSAGE, 0)
    }

    /// Local failure before or after dispatch.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(message, 0).with_kind(ErrorKind::Malformed)
    }

    /// Normalize an HTTP error response.
    ///
    /// Message comes from the body's `message`, then `detail`, then is
    /// synthesized from the status line. Re-normalizing a serialized
    /// `ApiError` with the same status yields an equal value.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed = body_json(body);

        let message = parsed
            .as_ref()
            .and_then(|v| text_field(v, "message").or_else(|| text_field(v, "detail")))
            .unwrap_or_else(|| status_line(status));
        let errors = parsed.as_ref().and_then(|v| v.get("errors")).and_then(field_errors);

        Self {
            message,
            errors,
            status_code: status.as_u16(),
            kind: ErrorKind::from_status(status.as_u16()),
        }
    }

    /// Error carried in a `success: false` envelope of an otherwise 2xx response.
    pub(crate) fn from_envelope(
        status: StatusCode,
        message: Option<String>,
        errors: Option<&Value>,
        status_code: Option<u16>,
    ) -> Self {
        let status_code = status_code.unwrap_or(status.as_u16());
        Self {
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status_line(status)),
            errors: errors.and_then(field_errors),
            status_code,
            kind: ErrorKind::from_status(status_code),
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failure; 0 when no response was involved.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }

    /// Field errors, empty when the server sent none.
    pub fn field_errors(&self) -> FieldErrors {
        self.errors.clone().unwrap_or_default()
    }

    /// Messages for one field.
    pub fn field(&self, name: &str) -> &[String] {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_auth_expired(&self) -> bool {
        self.kind == ErrorKind::AuthExpired
    }
}

fn status_line(status: StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Accepts `{field: [msg, ...]}` and `{field: "msg"}`; anything else is stringified.
fn field_errors(value: &Value) -> Option<FieldErrors> {
    let object = value.as_object()?;
    let errors = object
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(items) => items.iter().map(message_text).collect(),
                other => vec![message_text(other)],
            };
            (field.clone(), messages)
        })
        .collect();
    Some(errors)
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a body as JSON; empty or non-JSON bodies yield `None`.
fn body_json(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Failure of a single dispatch, before normalization.
#[derive(Debug, Error)]
pub(crate) enum TransportError {
    /// No response received: connect failure, timeout, reset.
    #[error("no response: {0}")]
    Network(#[source] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: StatusCode, body: Vec<u8> },

    /// The request could not be built.
    #[error("{0}")]
    Malformed(String),
}

impl TransportError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> String {
        match self {
            Self::Network(_) => "network".to_string(),
            Self::Status { status, .. } => status.as_u16().to_string(),
            Self::Malformed(_) => "malformed".to_string(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(_) => ApiError::network(),
            TransportError::Status { status, body } => ApiError::from_response(status, &body),
            TransportError::Malformed(message) => ApiError::malformed(message),
        }
    }
}
