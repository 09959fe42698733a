//! Per-command execution outcome and structured error detail.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use crate::ToolCommand;

/// Structured description of an invocation failure.
///
/// Transport and protocol errors are mapped into this shape explicitly by the client layer.
/// Anything that does not fit a named field lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Primary human-readable message.
    pub message: String,
    /// Protocol or OS error code, when one exists (JSON-RPC codes are rendered as numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Underlying cause, typically the source error's message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Raw payload returned by the server alongside the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    /// Fields the error carried that have no dedicated slot.
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub extra: JsonMap<String, Value>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_raw_response(mut self, raw_response: Value) -> Self {
        self.raw_response = Some(raw_response);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Render every populated field into a single multi-line string.
    ///
    /// The first line is always the message; each additional field is emitted on its own
    /// indented line so logs stay greppable.
    pub fn render(&self) -> String {
        let mut rendered = self.message.clone();
        if let Some(code) = &self.code {
            let _ = write!(rendered, "\n  code: {code}");
        }
        if let Some(cause) = &self.cause {
            let _ = write!(rendered, "\n  cause: {cause}");
        }
        if let Some(raw) = &self.raw_response {
            let _ = write!(rendered, "\n  response: {raw}");
        }
        for (key, value) in &self.extra {
            match value {
                Value::String(text) => {
                    let _ = write!(rendered, "\n  {key}: {text}");
                }
                other => {
                    let _ = write!(rendered, "\n  {key}: {other}");
                }
            }
        }
        rendered
    }
}

/// Outcome of one command attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub tool: String,
    pub success: bool,
    /// Tool response `content`; `None` when the call never produced a response.
    pub output: Option<Value>,
    /// The response's `structuredContent`, when the server sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<Value>,
    /// Rendered error text for failed attempts.
    pub error: Option<String>,
    /// Structured form of `error` when the failure was a thrown invocation error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Server-reported error flag; distinct from a transport failure.
    pub is_error: bool,
    pub optional: bool,
    pub source_line: usize,
}

impl ExecutionResult {
    /// Build a result from a response the server actually returned.
    pub fn from_response(command: &ToolCommand, content: Value, is_error: bool, duration_ms: u64) -> Self {
        Self {
            tool: command.tool.clone(),
            success: !is_error,
            error: is_error.then(|| format!("tool '{}' reported an error", command.tool)),
            output: Some(content),
            structured_output: None,
            error_detail: None,
            duration_ms,
            timestamp: Utc::now(),
            is_error,
            optional: command.optional,
            source_line: command.source_line,
        }
    }

    /// Attach the response's machine-readable content.
    pub fn with_structured_output(mut self, structured: Option<Value>) -> Self {
        self.structured_output = structured;
        self
    }

    /// Build a result for an attempt that failed before a response arrived.
    pub fn from_failure(command: &ToolCommand, detail: ErrorDetail, duration_ms: u64) -> Self {
        Self {
            tool: command.tool.clone(),
            success: false,
            output: None,
            structured_output: None,
            error: Some(detail.render()),
            error_detail: Some(detail),
            duration_ms,
            timestamp: Utc::now(),
            is_error: false,
            optional: command.optional,
            source_line: command.source_line,
        }
    }

    /// True when this failure must stop the run.
    pub fn halts_run(&self) -> bool {
        !self.success && !self.optional
    }
}
