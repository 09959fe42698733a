//! Shared type definitions for the MDC command runner.
//!
//! These types cross crate boundaries: the engine parses scripts into [`ToolCommand`]s, the
//! runner produces [`ExecutionResult`]s, and callers receive a [`Summary`]. They are kept free of
//! transport details so the CLI and tests can depend on them without pulling in `rmcp`.

mod execution;
mod summary;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

pub use execution::{ErrorDetail, ExecutionResult};
pub use summary::Summary;

/// One step parsed out of a script's tool-command block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCommand {
    /// Name of the tool to invoke on the server. Never empty.
    pub tool: String,
    /// Arguments forwarded verbatim as the tool call's `arguments` object.
    #[serde(default)]
    pub params: JsonMap<String, Value>,
    /// When true a failure is recorded but does not halt the run.
    #[serde(default)]
    pub optional: bool,
    /// 1-based line of the block's opening fence.
    pub source_line: usize,
}

impl ToolCommand {
    pub fn new(tool: impl Into<String>, source_line: usize) -> Self {
        Self {
            tool: tool.into(),
            params: JsonMap::new(),
            optional: false,
            source_line,
        }
    }

    pub fn with_params(mut self, params: JsonMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// Run-scoped input supplied by the caller.
///
/// Variables preserve insertion order so diagnostics list them the way the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used heavily in tests and by embedding callers.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

impl From<IndexMap<String, String>> for RunContext {
    fn from(variables: IndexMap<String, String>) -> Self {
        Self { variables }
    }
}
