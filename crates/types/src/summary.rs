//! Run-level outcome returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ExecutionResult;

/// Outcome of a whole run.
///
/// Built once by the engine's aggregator and never mutated afterwards. `success` is true only
/// when at least one command ran and none failed; optional failures still count as failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub success: bool,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Parsed commands that were never attempted because the run stopped early.
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub average_duration_ms: u64,
    /// Results in execution order.
    pub results: Vec<ExecutionResult>,
    /// Run-level failure that is not attributable to a single command.
    pub error: Option<String>,
    /// Warnings collected before execution started (parse and substitution diagnostics).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Summary {
    /// Process exit code for the CLI surface.
    pub fn exit_code(&self) -> i32 {
        if self.success { 0 } else { 1 }
    }
}
