//! # MDC Engine
//!
//! Turns an MDC script into an ordered list of tool invocations and drives them against a
//! [`ToolClient`](mdc_mcp::ToolClient), producing a [`Summary`].
//!
//! The pipeline is:
//!
//! 1. **`substitute`**: textual `{{name}}` replacement over the raw script.
//! 2. **`script`**: extraction of tool-command blocks into [`ToolCommand`]s.
//! 3. **`executor`**: the [`CommandRunner`] state machine (connect, execute in order, stop on the
//!    first critical failure, always disconnect).
//! 4. **`summary`**: folding results into run counts and timings.
//!
//! ## Usage
//!
//! ```rust
//! use mdc_engine::{RunContext, parse_script, substitute};
//!
//! let context = RunContext::new().with_variable("host", "example.com");
//! let script = "```mcp\n{\"tool\": \"browser_navigate\", \"params\": {\"url\": \"https://{{host}}\"}}\n```\n";
//!
//! let parsed = parse_script(&substitute(script, &context.variables));
//! assert_eq!(parsed.commands[0].params["url"], "https://example.com");
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use mdc_mcp::{LaunchConfig, ToolClient};
use tokio_util::sync::CancellationToken;

pub mod executor;
pub mod script;
pub mod substitute;
pub mod summary;

pub use executor::{CommandRunner, RUN_CANCELLED, RunPhase};
pub use mdc_types::{ErrorDetail, ExecutionResult, RunContext, Summary, ToolCommand};
pub use script::{DiagnosticKind, ParsedScript, ScriptDiagnostic, parse_script};
pub use substitute::{SubstitutedText, UnresolvedToken, extract_token_names, find_unresolved_tokens, substitute, substitute_lines};
pub use summary::{NO_EXECUTABLE_COMMANDS, RunNotes, summarize, summarize_with};

/// Run script text end to end with a fresh client.
///
/// Never fails: every problem after the text is in hand is reported through the returned
/// [`Summary`].
pub async fn run_script<C: ToolClient>(
    script_text: &str,
    context: &RunContext,
    client: C,
    launch: &LaunchConfig,
    cancel: CancellationToken,
) -> Summary {
    CommandRunner::new(client, launch.clone())
        .with_cancellation(cancel)
        .run_script(script_text, context)
        .await
}

/// Read a script file and run it.
///
/// # Errors
///
/// Returns an error only when the file cannot be read or is not UTF-8; those are usage errors
/// that happen before a run exists.
pub async fn run_script_file<C: ToolClient>(
    script_path: impl AsRef<Path>,
    context: &RunContext,
    client: C,
    launch: &LaunchConfig,
    cancel: CancellationToken,
) -> Result<Summary> {
    let script_text = read_script(script_path)?;
    Ok(run_script(&script_text, context, client, launch, cancel).await)
}

/// Load script text from disk.
pub fn read_script(script_path: impl AsRef<Path>) -> Result<String> {
    let script_path = script_path.as_ref();
    fs::read_to_string(script_path).with_context(|| format!("Failed to read script file: {}", script_path.display()))
}
