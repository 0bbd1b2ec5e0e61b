use thiserror::Error;

/// Failure to hand a message over to the chat channel.
///
/// Kept apart from [`RelayError`] so callers can tell "the notification channel is
/// broken" from "the content we wanted to send was bad".
#[derive(Debug, Error)]
#[error("Failed to deliver message to chat {chat_id}: {reason}")]
pub struct DeliveryError {
    pub chat_id: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(chat_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            reason: reason.into(),
        }
    }
}

/// Closed set of failures the relay can run into.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Transport failure during {request}: {source}")]
    Transport {
        request: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Review service at {endpoint} is unreachable (HTTP {status})")]
    Unreachable { endpoint: String, status: u16 },

    #[error("Malformed JSON in API response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Field `{field}` has unexpected type: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Missing required field `{0}` in API response")]
    MissingField(String),

    #[error("Unknown homework status: {}", .status.as_deref().unwrap_or("<missing>"))]
    UnknownStatus { status: Option<String> },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn transport(
        request: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RelayError::Transport {
            request: request.into(),
            source: source.into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        RelayError::TypeMismatch {
            field: field.into(),
            expected,
            found: json_kind(found),
        }
    }

    /// Whether the failure is scoped to a single polling iteration.
    ///
    /// `Config` and `Internal` are never recoverable: the first only happens at
    /// startup, the second indicates a bug rather than upstream trouble.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RelayError::Config(_) | RelayError::Internal(_))
    }

    /// Short stable name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Transport { .. } => "transport",
            RelayError::Unreachable { .. } => "unreachable",
            RelayError::MalformedResponse(_) => "malformed_response",
            RelayError::TypeMismatch { .. } => "type_mismatch",
            RelayError::MissingField(_) => "missing_field",
            RelayError::UnknownStatus { .. } => "unknown_status",
            RelayError::Delivery(_) => "delivery",
            RelayError::Config(_) => "config",
            RelayError::Internal(_) => "internal",
        }
    }
}

/// Name of a JSON value's kind, for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recoverable_kinds() {
        assert!(RelayError::Unreachable {
            endpoint: "http://localhost".to_string(),
            status: 503
        }
        .is_recoverable());
        assert!(RelayError::MissingField("homeworks".to_string()).is_recoverable());
        assert!(RelayError::UnknownStatus { status: None }.is_recoverable());
        assert!(RelayError::from(DeliveryError::new("42", "boom")).is_recoverable());

        assert!(!RelayError::Config("missing".to_string()).is_recoverable());
        assert!(!RelayError::Internal("bad url".to_string()).is_recoverable());
    }

    #[test]
    fn test_unknown_status_display() {
        let err = RelayError::UnknownStatus {
            status: Some("in_review".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown homework status: in_review");

        let err = RelayError::UnknownStatus { status: None };
        assert_eq!(err.to_string(), "Unknown homework status: <missing>");
    }

    #[test]
    fn test_type_mismatch_reports_found_kind() {
        let err = RelayError::type_mismatch("homeworks", "array", &json!({"a": 1}));
        assert_eq!(
            err.to_string(),
            "Field `homeworks` has unexpected type: expected array, found object"
        );
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_delivery_display_is_transparent() {
        let err = RelayError::from(DeliveryError::new("42", "Bad Request: chat not found"));
        assert_eq!(
            err.to_string(),
            "Failed to deliver message to chat 42: Bad Request: chat not found"
        );
    }
}
