//! Execution engine: drives parsed commands through a [`mdc_mcp::ToolClient`] one at a time.
//!
//! - `runner::CommandRunner` owns the client for exactly one run
//! - [`RunPhase`] names the states a run moves through; transitions are logged at debug level
//! - Critical failures stop the loop; optional failures are recorded and the loop continues

use std::fmt;

pub mod runner;
pub use runner::{CommandRunner, RUN_CANCELLED};

/// States of a single run.
///
/// `Idle → Parsing → {Empty → Failed | Connecting} → Connected → Executing(i) →
/// {Stopped | AllDone} → Disconnecting → Completed`. A connect failure goes straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Parsing,
    Empty,
    Connecting,
    Connected,
    /// Executing the command at this zero-based index.
    Executing(usize),
    /// A critical command failed or the run was cancelled; remaining commands are skipped.
    Stopped,
    AllDone,
    Disconnecting,
    Completed,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Executing(index) => write!(f, "Executing({index})"),
            other => write!(f, "{other:?}"),
        }
    }
}
