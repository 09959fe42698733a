//! stdio helpers for rmcp-backed tool clients.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::LaunchConfig;
use mdc_util::redact_sensitive;

/// Build a configured `tokio::process::Command` for stdio transport.
pub(crate) fn build_stdio_command(launch: &LaunchConfig) -> Command {
    let mut cmd = Command::new(&launch.command);
    cmd.args(&launch.args);
    for (key, value) in &launch.env {
        cmd.env(key, value);
    }
    if let Some(cwd) = &launch.cwd {
        cmd.current_dir(cwd);
    }
    // The server must not outlive the run even if teardown is skipped by a panic.
    cmd.kill_on_drop(true);
    cmd
}

/// Spawn a background task that forwards server stderr lines to tracing.
pub(crate) fn spawn_stderr_logger(server_label: String, stderr: ChildStderr) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "mdc_mcp::server", server = %server_label, "{}", redact_sensitive(&line));
        }
    })
}
