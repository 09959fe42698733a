use std::time::Instant;

use mdc_mcp::{LaunchConfig, ToolClient};
use mdc_types::{ErrorDetail, ExecutionResult, RunContext, Summary, ToolCommand};
use mdc_util::SecretMasker;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::RunPhase;
use crate::{
    script::parse_script,
    substitute::{find_unresolved_tokens, substitute_lines},
    summary::{NO_EXECUTABLE_COMMANDS, RunNotes, failed_before_start, summarize_with},
};

/// Error text recorded when the run's cancellation token fires.
pub const RUN_CANCELLED: &str = "run cancelled";

/// Executes one run against a tool server.
///
/// A runner owns its client exclusively and is consumed by [`CommandRunner::run_script`] or
/// [`CommandRunner::run_commands`]; concurrent runs each build their own runner and client.
/// The client is closed before either method returns, on every path.
pub struct CommandRunner<C: ToolClient> {
    client: C,
    launch: LaunchConfig,
    cancel: CancellationToken,
    masker: SecretMasker,
    phase: RunPhase,
}

impl<C: ToolClient> CommandRunner<C> {
    pub fn new(client: C, launch: LaunchConfig) -> Self {
        Self {
            client,
            launch,
            cancel: CancellationToken::new(),
            masker: SecretMasker::new(),
            phase: RunPhase::Idle,
        }
    }

    /// Attach a run-level cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Substitute, parse, and execute raw script text.
    pub async fn run_script(mut self, raw_text: &str, context: &RunContext) -> Summary {
        self.masker = SecretMasker::from_variables(context.variables.iter());
        if !self.masker.is_empty() {
            debug!("masking values of sensitive context variables");
        }
        self.enter(RunPhase::Parsing);

        // Line numbers refer to the caller's script even when values span several lines.
        let substituted = substitute_lines(raw_text, &context.variables);
        let parsed = parse_script(&substituted.text).map_lines(|line| substituted.origin_of(line));

        let mut diagnostics = Vec::new();
        for diagnostic in &parsed.diagnostics {
            warn!(line = diagnostic.line, "{}", diagnostic);
            diagnostics.push(diagnostic.to_string());
        }
        for command in &parsed.commands {
            for token in find_unresolved_tokens(&Value::Object(command.params.clone()), "params") {
                warn!(
                    tool = %command.tool,
                    line = command.source_line,
                    path = %token.source_path,
                    "unsubstituted variable '{{{{{}}}}}' left in parameters",
                    token.name
                );
                diagnostics.push(format!(
                    "line {}: tool '{}': unsubstituted variable '{{{{{}}}}}' at {}",
                    command.source_line, command.tool, token.name, token.source_path
                ));
            }
        }

        self.run_commands(parsed.commands, diagnostics).await
    }

    /// Execute already-parsed commands in order.
    pub async fn run_commands(mut self, commands: Vec<ToolCommand>, diagnostics: Vec<String>) -> Summary {
        let diagnostics: Vec<String> = diagnostics.iter().map(|line| self.masker.redact(line)).collect();

        if commands.is_empty() {
            self.enter(RunPhase::Empty);
            warn!("{}", NO_EXECUTABLE_COMMANDS);
            self.enter(RunPhase::Failed);
            return failed_before_start(NO_EXECUTABLE_COMMANDS, 0, diagnostics);
        }

        self.enter(RunPhase::Connecting);
        if let Err(message) = self.connect().await {
            warn!(error = %message, "run aborted before the first command");
            self.client.close().await;
            self.enter(RunPhase::Failed);
            return failed_before_start(message, commands.len(), diagnostics);
        }
        self.enter(RunPhase::Connected);
        self.log_capabilities().await;

        let mut results: Vec<ExecutionResult> = Vec::with_capacity(commands.len());
        let mut stopped = false;
        let mut interrupted = false;
        for (index, command) in commands.iter().enumerate() {
            self.enter(RunPhase::Executing(index));
            let result = self.execute_command(command).await;
            self.log_result(index, commands.len(), &result);

            // A command that finished before the token fired keeps its result; the next one records the cancellation.
            interrupted = is_cancellation(&result);
            let halts = result.halts_run() || interrupted;
            results.push(result);
            if halts {
                stopped = true;
                break;
            }
        }
        self.enter(if stopped { RunPhase::Stopped } else { RunPhase::AllDone });

        self.enter(RunPhase::Disconnecting);
        debug!(status = %self.client.status(), "closing tool client");
        self.client.close().await;
        self.enter(RunPhase::Completed);

        let skipped = commands.len() - results.len();
        if skipped > 0 {
            info!(skipped, "remaining commands were not executed");
        }
        summarize_with(
            results,
            RunNotes {
                skipped,
                error: interrupted.then(|| RUN_CANCELLED.to_string()),
                diagnostics,
            },
        )
    }

    async fn connect(&mut self) -> Result<(), String> {
        let cancel = self.cancel.clone();
        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RUN_CANCELLED.to_string()),
            connected = self.client.connect(&self.launch) => connected,
        };
        connected.map_err(|err| self.masker.redact(&err.to_detail().render()))
    }

    async fn log_capabilities(&mut self) {
        let cancel = self.cancel.clone();
        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            listed = self.client.list_capabilities() => listed,
        };
        match listed {
            Ok(tools) => {
                let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
                info!(count = tools.len(), tools = %names.join(", "), "server capabilities");
            }
            Err(err) => warn!(error = %err, "could not list server capabilities"),
        }
    }

    async fn execute_command(&mut self, command: &ToolCommand) -> ExecutionResult {
        info!(tool = %command.tool, line = command.source_line, optional = command.optional, "executing command");
        let params = self.masker.redact_value(&Value::Object(command.params.clone()));
        debug!(tool = %command.tool, params = %params, "command parameters");

        if self.cancel.is_cancelled() {
            return ExecutionResult::from_failure(command, cancelled_detail(), 0);
        }

        let cancel = self.cancel.clone();
        let started_at = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            invoked = self.client.invoke(&command.tool, &command.params) => Some(invoked),
        };
        let duration_ms = started_at.elapsed().as_millis().try_into().unwrap_or(u64::MAX);

        match outcome {
            Some(Ok(response)) => ExecutionResult::from_response(command, response.content, response.is_error, duration_ms)
                .with_structured_output(response.structured_content),
            Some(Err(err)) => ExecutionResult::from_failure(command, self.redact_detail(err.to_detail()), duration_ms),
            None => ExecutionResult::from_failure(command, cancelled_detail(), duration_ms),
        }
    }

    fn redact_detail(&self, mut detail: ErrorDetail) -> ErrorDetail {
        detail.message = self.masker.redact(&detail.message);
        detail.cause = detail.cause.map(|cause| self.masker.redact(&cause));
        detail.raw_response = detail.raw_response.map(|raw| self.masker.redact_value(&raw));
        detail.extra = detail
            .extra
            .into_iter()
            .map(|(key, value)| (key, self.masker.redact_value(&value)))
            .collect();
        detail
    }

    fn log_result(&self, index: usize, total: usize, result: &ExecutionResult) {
        let position = format!("{}/{}", index + 1, total);
        if result.success {
            info!(step = %position, tool = %result.tool, duration_ms = result.duration_ms, "command succeeded");
        } else if result.optional {
            warn!(
                step = %position,
                tool = %result.tool,
                error = result.error.as_deref().unwrap_or("unknown error"),
                "optional command failed; continuing"
            );
        } else {
            warn!(
                step = %position,
                tool = %result.tool,
                error = result.error.as_deref().unwrap_or("unknown error"),
                "critical command failed; stopping"
            );
        }
    }

    fn enter(&mut self, next: RunPhase) {
        debug!(from = %self.phase, to = %next, "run phase transition");
        self.phase = next;
    }
}

const CANCELLED_CODE: &str = "cancelled";

fn cancelled_detail() -> ErrorDetail {
    ErrorDetail::new(RUN_CANCELLED).with_code(CANCELLED_CODE)
}

fn is_cancellation(result: &ExecutionResult) -> bool {
    result.error_detail.as_ref().and_then(|detail| detail.code.as_deref()) == Some(CANCELLED_CODE)
}
