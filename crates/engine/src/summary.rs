//! Folds per-command results into a run [`Summary`].

use chrono::Utc;
use mdc_types::{ExecutionResult, Summary};

/// Message used when a script contains nothing executable.
pub const NO_EXECUTABLE_COMMANDS: &str = "no executable commands found in script";

/// Run-level facts that are not derivable from the results themselves.
#[derive(Debug, Clone, Default)]
pub struct RunNotes {
    /// Parsed commands never attempted.
    pub skipped: usize,
    /// Run-level error, if the run did not end normally.
    pub error: Option<String>,
    pub diagnostics: Vec<String>,
}

/// Fold results into counts and timings.
///
/// A run with no results is never successful and carries the "no executable commands" error,
/// so an empty summary is never silent.
pub fn summarize(results: Vec<ExecutionResult>) -> Summary {
    let total = results.len();
    let successful = results.iter().filter(|result| result.success).count();
    let failed = total - successful;
    let total_duration_ms: u64 = results.iter().map(|result| result.duration_ms).sum();
    let average_duration_ms = if total > 0 { total_duration_ms / total as u64 } else { 0 };

    Summary {
        success: total > 0 && failed == 0,
        total,
        successful,
        failed,
        skipped: 0,
        total_duration_ms,
        average_duration_ms,
        results,
        error: (total == 0).then(|| NO_EXECUTABLE_COMMANDS.to_string()),
        diagnostics: Vec::new(),
        timestamp: Utc::now(),
    }
}

/// [`summarize`], then attach run-level notes. A note's error replaces the default one.
pub fn summarize_with(results: Vec<ExecutionResult>, notes: RunNotes) -> Summary {
    let mut summary = summarize(results);
    summary.skipped = notes.skipped;
    if notes.error.is_some() {
        summary.error = notes.error;
    }
    summary.diagnostics = notes.diagnostics;
    summary
}

/// Summary for a run that failed before any command executed.
pub fn failed_before_start(error: impl Into<String>, skipped: usize, diagnostics: Vec<String>) -> Summary {
    summarize_with(
        Vec::new(),
        RunNotes {
            skipped,
            error: Some(error.into()),
            diagnostics,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdc_types::{ErrorDetail, ToolCommand};
    use serde_json::json;

    fn ok(tool: &str, duration_ms: u64) -> ExecutionResult {
        ExecutionResult::from_response(&ToolCommand::new(tool, 1), json!("ok"), false, duration_ms)
    }

    fn failed(tool: &str, duration_ms: u64) -> ExecutionResult {
        ExecutionResult::from_failure(&ToolCommand::new(tool, 1), ErrorDetail::new("boom"), duration_ms)
    }

    #[test]
    fn counts_and_durations() {
        let summary = summarize(vec![ok("a", 10), failed("b", 20), ok("c", 31)]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.successful + summary.failed, summary.total);
        assert!(!summary.success);
        assert_eq!(summary.total_duration_ms, 61);
        assert_eq!(summary.average_duration_ms, 20);
        assert!(summary.error.is_none());
    }

    #[test]
    fn all_successful_is_success() {
        let summary = summarize(vec![ok("a", 1), ok("b", 2)]);
        assert!(summary.success);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn empty_results_are_not_success() {
        let summary = summarize(Vec::new());

        assert_eq!(summary.total, 0);
        assert_eq!(summary.failed, 0);
        assert!(!summary.success);
        assert_eq!(summary.average_duration_ms, 0);
        assert_eq!(summary.error.as_deref(), Some(NO_EXECUTABLE_COMMANDS));
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn failed_before_start_keeps_reason() {
        let summary = failed_before_start("Connection error: spawn failed", 3, vec!["line 2: warning".into()]);

        assert!(!summary.success);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.error.as_deref(), Some("Connection error: spawn failed"));
        assert_eq!(summary.diagnostics.len(), 1);
    }

    #[test]
    fn results_keep_execution_order() {
        let summary = summarize(vec![ok("first", 1), ok("second", 1), ok("third", 1)]);
        let tools: Vec<_> = summary.results.iter().map(|r| r.tool.as_str()).collect();
        assert_eq!(tools, vec!["first", "second", "third"]);
    }
}
