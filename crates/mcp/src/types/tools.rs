//! Tool metadata and call responses exchanged with the MCP server.
//!
//! These wrap the `rmcp` models in serde-friendly shapes so the engine never depends on `rmcp`
//! internals.

use rmcp::model::{CallToolResult, Tool as RmcpTool};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An invocable tool advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCapability {
    /// Tool identifier returned by the MCP server.
    pub name: String,
    /// Optional description explaining the tool's behavior.
    pub description: Option<String>,
}

impl ToolCapability {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

impl From<RmcpTool> for ToolCapability {
    fn from(tool: RmcpTool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.as_ref().map(|d| d.to_string()),
        }
    }
}

/// Response to a single `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// The call's `content` array.
    pub content: Value,
    /// Machine-readable `structuredContent`, when the server sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Whether the server flagged the call as a logical failure.
    pub is_error: bool,
}

impl ToolResponse {
    pub fn ok(content: Value) -> Self {
        Self {
            content,
            structured_content: None,
            is_error: false,
        }
    }

    pub fn error(content: Value) -> Self {
        Self {
            content,
            structured_content: None,
            is_error: true,
        }
    }

    /// Convert a raw rmcp result through its JSON form.
    pub fn from_call_result(result: &CallToolResult) -> Result<Self, serde_json::Error> {
        let raw = serde_json::to_value(result)?;
        Ok(Self::from_raw(raw))
    }

    pub(crate) fn from_raw(raw: Value) -> Self {
        let is_error = raw.get("isError").and_then(Value::as_bool).unwrap_or(false);
        let content = raw.get("content").cloned().unwrap_or(Value::Null);
        let structured_content = raw.get("structuredContent").filter(|structured| !structured.is_null()).cloned();
        Self {
            content,
            structured_content,
            is_error,
        }
    }
}
