//! Response normalization.
//!
//! The API answers either with an envelope
//!
//! ```text
//! { "success": true, "message": "...", "data": T | null, "errors": ..., "status_code": 200 }
//! ```
//!
//! or with the bare payload `T`. The boolean `success` field is the single
//! discriminator: an object carrying it is decoded as an envelope, anything
//! else as a bare payload. Callers only ever receive `T`.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::http::error::ApiError;

/// Name of the field that marks an envelope.
pub const ENVELOPE_DISCRIMINATOR: &str = "success";

/// Response envelope with an undecoded payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Result of the boundary decode step.
#[derive(Debug, Clone)]
pub enum ResponseShape {
    Envelope(Envelope),
    Bare(Value),
}

impl ResponseShape {
    /// Classify a JSON document by the discriminator field.
    pub fn classify(value: Value) -> Result<Self, serde_json::Error> {
        let is_envelope = value
            .get(ENVELOPE_DISCRIMINATOR)
            .is_some_and(Value::is_boolean);

        if is_envelope {
            serde_json::from_value(value).map(Self::Envelope)
        } else {
            Ok(Self::Bare(value))
        }
    }

    /// Parse raw bytes. An empty body is JSON `null`.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::Bare(Value::Null));
        }
        Self::classify(serde_json::from_slice(body)?)
    }

    /// The inner payload, or the error a `success: false` envelope carries.
    pub fn into_payload(self, status: StatusCode) -> Result<Value, ApiError> {
        match self {
            Self::Bare(value) => Ok(value),
            Self::Envelope(envelope) if envelope.success => Ok(envelope.data),
            Self::Envelope(envelope) => Err(ApiError::from_envelope(
                status,
                envelope.message,
                envelope.errors.as_ref(),
                envelope.status_code,
            )),
        }
    }
}

/// Decode a successful response body into the caller's type.
pub fn decode_payload<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    let shape = ResponseShape::parse(body)
        .map_err(|e| ApiError::malformed(format!("Invalid response body: {e}")))?;
    let payload = shape.into_payload(status)?;
    serde_json::from_value(payload)
        .map_err(|e| ApiError::malformed(format!("Unexpected response shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::ErrorKind;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tag {
        id: u32,
        name: String,
    }

    #[test]
    fn envelope_and_bare_decode_to_the_same_value() {
        let bare = json!([{ "id": 1, "name": "rust" }]);
        let wrapped = json!({
            "success": true,
            "message": "Success",
            "data": [{ "id": 1, "name": "rust" }],
            "status_code": 200
        });

        let a: Vec<Tag> = decode_payload(StatusCode::OK, bare.to_string().as_bytes()).unwrap();
        let b: Vec<Tag> = decode_payload(StatusCode::OK, wrapped.to_string().as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].name, "rust");
    }

    #[test]
    fn non_boolean_success_field_is_bare() {
        let body = json!({ "success": "yes", "id": 3 });
        let shape = ResponseShape::classify(body).unwrap();
        assert!(matches!(shape, ResponseShape::Bare(_)));
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        decode_payload::<()>(StatusCode::NO_CONTENT, b"").unwrap();
    }

    #[test]
    fn envelope_without_data_decodes_as_unit() {
        let body = json!({ "success": true, "message": "Logout successful", "data": null });
        decode_payload::<()>(StatusCode::OK, body.to_string().as_bytes()).unwrap();
    }

    #[test]
    fn failed_envelope_becomes_error() {
        let body = json!({
            "success": false,
            "message": "Question is closed",
            "errors": { "question": ["Closed questions cannot be answered."] },
            "status_code": 409
        });
        let err = decode_payload::<Value>(StatusCode::OK, body.to_string().as_bytes()).unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert_eq!(err.message(), "Question is closed");
        assert_eq!(err.field("question"), ["Closed questions cannot be answered."]);
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        let err = decode_payload::<Vec<Tag>>(StatusCode::OK, br#"{"id": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.status_code(), 0);
    }
}
