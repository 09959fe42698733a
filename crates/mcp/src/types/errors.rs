//! Error types for the tool client.

use mdc_types::ErrorDetail;
use serde_json::{Value, json};
use thiserror::Error;

/// Failures raised by a [`crate::ToolClient`].
///
/// Connection-phase variants are fatal for a run; invocation-phase variants are captured into the
/// failing command's result.
#[derive(Debug, Error)]
pub enum ToolClientError {
    #[error("Connection error: {message}")]
    Connection { message: String, cause: Option<String> },

    #[error("Handshake error: server did not complete initialization within {timeout_ms}ms")]
    HandshakeTimeout { timeout_ms: u64 },

    #[error("Client is not connected")]
    NotConnected,

    #[error("Tool invocation error: {tool_name} - {message}")]
    Protocol {
        tool_name: String,
        code: i32,
        message: String,
        data: Option<Value>,
    },

    #[error("Transport error: {tool_name} - {message}")]
    Transport { tool_name: String, message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolClientError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a connection error carrying its source.
    pub fn connection_with_cause(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Connection {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Create a transport error.
    pub fn transport(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Map this error into the explicit detail structure carried by execution results.
    pub fn to_detail(&self) -> ErrorDetail {
        let detail = ErrorDetail::new(self.to_string());
        match self {
            Self::Connection { cause, .. } => match cause {
                Some(cause) => detail.with_cause(cause.clone()),
                None => detail,
            },
            Self::HandshakeTimeout { timeout_ms } => detail.with_code("handshake_timeout").with_extra("timeoutMs", json!(timeout_ms)),
            Self::NotConnected => detail.with_code("not_connected"),
            Self::Protocol { code, data, .. } => {
                let detail = detail.with_code(code.to_string());
                match data {
                    Some(data) => detail.with_raw_response(data.clone()),
                    None => detail,
                }
            }
            Self::Transport { .. } => detail.with_code("transport"),
            Self::Timeout { operation, timeout_ms } => detail
                .with_code("timeout")
                .with_extra("operation", json!(operation))
                .with_extra("timeoutMs", json!(timeout_ms)),
            Self::Serialization(err) => detail.with_code("serialization").with_cause(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ToolClientError::connection("spawn failed");
        assert!(matches!(err, ToolClientError::Connection { cause: None, .. }));

        let err = ToolClientError::timeout("tools/call browser_click", 5000);
        assert!(matches!(err, ToolClientError::Timeout { .. }));

        let err = ToolClientError::transport("browser_click", "connection closed");
        assert!(matches!(err, ToolClientError::Transport { .. }));
    }

    #[test]
    fn protocol_error_detail_keeps_code_and_data() {
        let err = ToolClientError::Protocol {
            tool_name: "browser_click".into(),
            code: -32602,
            message: "invalid params".into(),
            data: Some(json!({"field": "selector"})),
        };
        let detail = err.to_detail();

        assert_eq!(detail.code.as_deref(), Some("-32602"));
        assert_eq!(detail.raw_response, Some(json!({"field": "selector"})));
        assert!(detail.message.contains("browser_click"));
    }

    #[test]
    fn connection_detail_keeps_cause() {
        let err = ToolClientError::connection_with_cause("failed to spawn 'npx'", "No such file or directory");
        let detail = err.to_detail();
        assert_eq!(detail.cause.as_deref(), Some("No such file or directory"));
        assert!(detail.render().contains("cause: No such file or directory"));
    }

    #[test]
    fn timeout_detail_has_extra_fields() {
        let detail = ToolClientError::timeout("tools/call slow", 250).to_detail();
        assert_eq!(detail.code.as_deref(), Some("timeout"));
        assert_eq!(detail.extra["timeoutMs"], json!(250));
    }
}
