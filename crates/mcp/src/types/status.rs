//! Connection status for the tool client.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single client connection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never connected.
    #[default]
    Idle,
    /// Spawning the server and performing the handshake.
    Connecting,
    /// Handshake completed; tools may be invoked.
    Connected,
    /// Connect attempt failed; nothing to release except a possible half-started process.
    Failed,
    /// Closed after use. Terminal.
    Closed,
}

impl ConnectionStatus {
    /// Get the display text for this status.
    pub fn display(&self) -> &'static str {
        match self {
            ConnectionStatus::Idle => "Idle",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Failed => "Failed",
            ConnectionStatus::Closed => "Closed",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
