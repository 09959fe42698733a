//! Data models for the server launch configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::{InterpolationError, ValidationError};

/// Default budget for spawning the server and completing the MCP initialize handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 30_000;
/// Default budget for a single `tools/call` round trip.
pub const DEFAULT_INVOCATION_TIMEOUT_MS: u64 = 60_000;

/// How to start the stdio tool server for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LaunchConfig {
    /// Executable to spawn.
    pub command: String,

    /// Arguments to pass to the command.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables to set for the process. Values support `${env:NAME}`.
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Working directory for the process.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Upper bound for spawn plus handshake.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Upper bound for each tool invocation.
    #[serde(default = "default_invocation_timeout_ms")]
    pub invocation_timeout_ms: u64,
}

fn default_handshake_timeout_ms() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_MS
}

fn default_invocation_timeout_ms() -> u64 {
    DEFAULT_INVOCATION_TIMEOUT_MS
}

impl Default for LaunchConfig {
    /// Playwright's MCP server via `npx`, the server MDC scripts are written against.
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec!["@playwright/mcp@latest".to_string()],
            env: IndexMap::new(),
            cwd: None,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            invocation_timeout_ms: DEFAULT_INVOCATION_TIMEOUT_MS,
        }
    }
}

impl LaunchConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Append a flag unless it is already present.
    pub fn push_flag(&mut self, flag: &str) {
        if !self.args.iter().any(|arg| arg == flag) {
            self.args.push(flag.to_string());
        }
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms)
    }

    /// Human-readable command line for logs.
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Errors that can occur while loading the launch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}
