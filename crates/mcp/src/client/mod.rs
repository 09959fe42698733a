//! rmcp-backed tool client subsystem facade.
//!
//! [`ToolClient`] is the seam the engine drives; [`McpToolClient`] is the production
//! implementation speaking MCP to a spawned stdio server.

mod core;
mod echo;
mod stdio;

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value};

use crate::{
    config::LaunchConfig,
    types::{ConnectionStatus, ToolCapability, ToolClientError, ToolResponse},
};

pub use core::McpToolClient;
pub use echo::EchoToolClient;

/// One exclusive session with a tool-invocation server.
///
/// A client is owned by a single run. `close` must be safe to call repeatedly and when `connect`
/// never succeeded.
#[async_trait]
pub trait ToolClient: Send {
    /// Start the server process and complete the protocol handshake.
    async fn connect(&mut self, launch: &LaunchConfig) -> Result<(), ToolClientError>;

    /// List the tools the server advertises. Informational only.
    async fn list_capabilities(&mut self) -> Result<Vec<ToolCapability>, ToolClientError>;

    /// Invoke one tool and wait for its response.
    async fn invoke(&mut self, tool: &str, arguments: &JsonMap<String, Value>) -> Result<ToolResponse, ToolClientError>;

    /// Tear down the session and release the server process.
    async fn close(&mut self);

    /// Current connection status.
    fn status(&self) -> ConnectionStatus;
}
