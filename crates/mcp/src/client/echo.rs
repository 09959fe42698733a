//! A client that never starts a server. Backs `--dry-run` and tests.

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value, json};
use tracing::info;

use crate::{
    client::ToolClient,
    config::LaunchConfig,
    types::{ConnectionStatus, ToolCapability, ToolClientError, ToolResponse},
};

/// Answers every invocation with a synthetic payload echoing the call.
#[derive(Debug, Default)]
pub struct EchoToolClient {
    status: ConnectionStatus,
}

impl EchoToolClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ToolClient for EchoToolClient {
    async fn connect(&mut self, launch: &LaunchConfig) -> Result<(), ToolClientError> {
        info!(command = %launch.display_command(), "dry run; tool server not started");
        self.status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn list_capabilities(&mut self) -> Result<Vec<ToolCapability>, ToolClientError> {
        Ok(Vec::new())
    }

    async fn invoke(&mut self, tool: &str, arguments: &JsonMap<String, Value>) -> Result<ToolResponse, ToolClientError> {
        if !self.status.is_connected() {
            return Err(ToolClientError::NotConnected);
        }
        Ok(ToolResponse::ok(json!({ "tool": tool, "arguments": arguments })))
    }

    async fn close(&mut self) {
        if !matches!(self.status, ConnectionStatus::Idle) {
            self.status = ConnectionStatus::Closed;
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.status
    }
}
