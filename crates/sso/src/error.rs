use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::signing::KeyError;

pub type SsoResult<T> = Result<T, SsoError>;

/// Description attached to every signature failure. Callers match on it, so the
/// spelling is kept as the provider clients have always sent it.
pub const SIGNATURE_DESCRIPTION: &str = "signiture file invalid or not found";

/// The fixed set of failure kinds a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    NotFound,
    Timeout,
    InternalServerError,
    Conflict,
    AlreadyExists,
    NotImplemented,
    TooManyRequests,
    ServiceUnavailable,
    MissingSignatureConfiguration,
    InvalidSignature,
}

impl ErrorKind {
    /// Wire identifier carried in the `error` field.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalidInput",
            ErrorKind::Unauthorized => "unauthorizedAccess",
            ErrorKind::NotFound => "resourceNotFound",
            ErrorKind::Timeout => "operationTimedOut",
            ErrorKind::InternalServerError => "internalServerError",
            ErrorKind::Conflict => "conflictOccurred",
            ErrorKind::AlreadyExists => "resourceAlreadyExists",
            ErrorKind::NotImplemented => "featureNotImplemented",
            ErrorKind::TooManyRequests => "tooManyRequests",
            ErrorKind::ServiceUnavailable => "serviceUnavailable",
            ErrorKind::MissingSignatureConfiguration => "signatureKeyOrFileIsMissing",
            ErrorKind::InvalidSignature => "signatureInvalid",
        }
    }

    /// Kind reported for a non-success HTTP status from the provider.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Unauthorized,
            404 => ErrorKind::NotFound,
            408 | 504 => ErrorKind::Timeout,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::TooManyRequests,
            501 => ErrorKind::NotImplemented,
            502 | 503 => ErrorKind::ServiceUnavailable,
            400..=499 => ErrorKind::InvalidInput,
            _ => ErrorKind::InternalServerError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in the call path where a failure was first detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Send,
    ReadBody,
    Decode,
    Status(u16),
}

/// The single error shape returned by every operation.
///
/// The payload is a flat JSON object. Local failures carry `code`, `error` and
/// `errorDescription`; provider failures carry the HTTP status as `code` merged
/// with whatever fields the provider returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", render(.fields))]
pub struct SsoError {
    kind: ErrorKind,
    fields: Map<String, Value>,
}

fn render(fields: &Map<String, Value>) -> String {
    serde_json::to_string(fields).unwrap_or_else(|_| "failed to marshal error message".to_string())
}

impl SsoError {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".into(), Value::from(kind.as_str()));
        fields.insert("errorDescription".into(), Value::from(description.into()));
        Self { kind, fields }
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput, "invalid input")
    }

    pub fn missing_signature() -> Self {
        Self::new(
            ErrorKind::MissingSignatureConfiguration,
            "signature key or file missing",
        )
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.fields.insert("code".into(), Value::from(code));
        self
    }

    /// Builds the error for a non-success status. A JSON object body is merged
    /// field by field; any other non-empty body is kept verbatim under `body`.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let kind = ErrorKind::from_status(status);
        let mut fields = Map::new();
        fields.insert("error".into(), Value::from(kind.as_str()));

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(remote)) => {
                for (key, value) in remote {
                    if key != "code" {
                        fields.insert(key, value);
                    }
                }
            }
            _ if body.is_empty() => {}
            _ => {
                fields.insert(
                    "body".into(),
                    Value::from(String::from_utf8_lossy(body).into_owned()),
                );
            }
        }

        fields.insert("code".into(), Value::from(status));
        Self { kind, fields }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric status, when one is known.
    pub fn code(&self) -> Option<u16> {
        self.fields
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("errorDescription").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for SsoError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl From<KeyError> for SsoError {
    fn from(error: KeyError) -> Self {
        tracing::warn!(%error, "signature could not be produced");
        SsoError::new(ErrorKind::InvalidSignature, SIGNATURE_DESCRIPTION)
    }
}

/// Folds a failure observed at `stage` into the normalized error. `body` is the
/// response body when one was read.
pub fn normalize(stage: Stage, body: &[u8]) -> SsoError {
    let error = match stage {
        Stage::Build | Stage::Send => {
            SsoError::new(ErrorKind::ServiceUnavailable, "service unavailable").with_code(503)
        }
        Stage::ReadBody => SsoError::new(
            ErrorKind::InternalServerError,
            "service error reading response body",
        )
        .with_code(500),
        Stage::Decode => {
            SsoError::new(ErrorKind::InternalServerError, "service error unmarshal json")
                .with_code(500)
        }
        Stage::Status(status) => SsoError::from_status(status, body),
    };
    tracing::warn!(kind = %error.kind(), code = ?error.code(), "request failed");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transport_failure_is_503() {
        let error = normalize(Stage::Send, b"");
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(error.code(), Some(503));
        assert_eq!(error.get("error"), Some(&json!("serviceUnavailable")));
    }

    #[test]
    fn local_read_and_decode_failures_are_500() {
        let read = normalize(Stage::ReadBody, b"");
        assert_eq!(read.code(), Some(500));
        assert_eq!(read.description(), Some("service error reading response body"));

        let decode = normalize(Stage::Decode, b"<html>");
        assert_eq!(decode.kind(), ErrorKind::InternalServerError);
        assert_eq!(decode.description(), Some("service error unmarshal json"));
    }

    #[test]
    fn status_error_merges_object_body() {
        let error = normalize(Stage::Status(404), br#"{"reason":"x"}"#);
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.code(), Some(404));
        assert_eq!(error.get("reason"), Some(&json!("x")));
    }

    #[test]
    fn status_owns_code_field() {
        let error = SsoError::from_status(400, br#"{"code":"invalid_grant","error":"invalid_grant"}"#);
        assert_eq!(error.code(), Some(400));
        assert_eq!(error.get("error"), Some(&json!("invalid_grant")));
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn non_object_body_is_kept_raw() {
        let error = SsoError::from_status(500, b"[1,2]");
        assert_eq!(error.get("body"), Some(&json!("[1,2]")));

        let empty = SsoError::from_status(401, b"");
        assert!(empty.get("body").is_none());
        assert_eq!(empty.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn display_is_json_object() {
        let error = SsoError::invalid_input();
        let parsed: Value = serde_json::from_str(&error.to_string()).unwrap();
        assert_eq!(
            parsed,
            json!({"error": "invalidInput", "errorDescription": "invalid input"})
        );
    }

    #[test]
    fn status_mapping_covers_common_codes() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::TooManyRequests);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::InvalidInput);
        assert_eq!(ErrorKind::from_status(504), ErrorKind::Timeout);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::InternalServerError);
    }

    #[test]
    fn key_errors_become_invalid_signature() {
        let error: SsoError = KeyError::Decode("bad".into()).into();
        assert_eq!(error.kind(), ErrorKind::InvalidSignature);
        assert_eq!(error.description(), Some(SIGNATURE_DESCRIPTION));
    }
}
