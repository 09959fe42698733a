//! McpToolClient: lifecycle and invocation for an rmcp-backed stdio server.

use std::{
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use rmcp::{
    RoleClient,
    model::CallToolRequestParams,
    service::{RunningService, ServiceError, ServiceExt as _},
    transport::TokioChildProcess,
};
use serde_json::{Map as JsonMap, Value};
use tokio::{task::JoinHandle, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    client::ToolClient,
    config::LaunchConfig,
    types::{ConnectionStatus, ToolCapability, ToolClientError, ToolResponse},
};

use super::stdio::{build_stdio_command, spawn_stderr_logger};

/// rmcp-backed tool client bound to one spawned server process.
#[derive(Debug, Default)]
pub struct McpToolClient {
    /// Current connection status.
    status: ConnectionStatus,
    /// Underlying rmcp running service when connected.
    service: Option<RunningService<RoleClient, ()>>,
    /// Background task forwarding server stderr.
    stderr_task: Option<JoinHandle<()>>,
    /// Per-call budget taken from the launch configuration at connect time.
    invocation_timeout: Duration,
}

impl McpToolClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server name reported during initialization, if connected.
    pub fn server_name(&self) -> Option<String> {
        self.service
            .as_ref()
            .and_then(|service| service.peer_info())
            .map(|info| info.server_info.name.clone())
    }

    fn running_service(&self) -> Result<&RunningService<RoleClient, ()>, ToolClientError> {
        match (&self.status, &self.service) {
            (ConnectionStatus::Connected, Some(service)) => Ok(service),
            _ => Err(ToolClientError::NotConnected),
        }
    }

    async fn spawn_and_initialize(&mut self, launch: &LaunchConfig) -> Result<RunningService<RoleClient, ()>, ToolClientError> {
        let command = build_stdio_command(launch);
        let (transport, stderr_opt) = TokioChildProcess::builder(command)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ToolClientError::connection_with_cause(format!("failed to spawn '{}'", launch.display_command()), err))?;

        if let Some(stderr) = stderr_opt {
            self.stderr_task = Some(spawn_stderr_logger(launch.command.clone(), stderr));
        }

        match timeout(launch.handshake_timeout(), ().serve(transport)).await {
            Ok(Ok(service)) => Ok(service),
            Ok(Err(err)) => Err(ToolClientError::connection_with_cause("MCP initialize handshake failed", err)),
            Err(_) => Err(ToolClientError::HandshakeTimeout {
                timeout_ms: launch.handshake_timeout_ms,
            }),
        }
    }

    fn abort_stderr_task(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl ToolClient for McpToolClient {
    async fn connect(&mut self, launch: &LaunchConfig) -> Result<(), ToolClientError> {
        if self.status.is_connected() {
            return Err(ToolClientError::connection("client is already connected"));
        }
        self.status = ConnectionStatus::Connecting;
        let start_time = Instant::now();
        info!(command = %launch.display_command(), "starting tool server");

        match self.spawn_and_initialize(launch).await {
            Ok(service) => {
                self.service = Some(service);
                self.invocation_timeout = launch.invocation_timeout();
                self.status = ConnectionStatus::Connected;
                let latency: u64 = start_time.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
                info!(
                    server = self.server_name().as_deref().unwrap_or("unknown"),
                    handshake_ms = latency,
                    "tool server connected"
                );
                Ok(())
            }
            Err(err) => {
                self.status = ConnectionStatus::Failed;
                self.abort_stderr_task();
                Err(err)
            }
        }
    }

    async fn list_capabilities(&mut self) -> Result<Vec<ToolCapability>, ToolClientError> {
        let service = self.running_service()?;
        let tools = service
            .list_all_tools()
            .await
            .map_err(|err| map_service_error("tools/list", err))?
            .into_iter()
            .map(ToolCapability::from)
            .collect::<Vec<_>>();
        debug!(count = tools.len(), "listed server tools");
        Ok(tools)
    }

    async fn invoke(&mut self, tool: &str, arguments: &JsonMap<String, Value>) -> Result<ToolResponse, ToolClientError> {
        let service = self.running_service()?;

        let call_future = service.call_tool(CallToolRequestParams {
            name: tool.to_string().into(),
            arguments: Some(arguments.clone()),
            task: None,
            meta: None,
        });

        let result = with_invocation_timeout(tool, self.invocation_timeout, call_future).await?;
        Ok(ToolResponse::from_call_result(&result)?)
    }

    async fn close(&mut self) {
        if let Some(running) = self.service.take() {
            if let Err(err) = running.cancel().await {
                warn!(error = %err, "tool server did not shut down cleanly");
            }
            debug!("tool server session closed");
        }
        self.abort_stderr_task();
        if !matches!(self.status, ConnectionStatus::Idle) {
            self.status = ConnectionStatus::Closed;
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.status
    }
}

/// Bound one `tools/call` by the configured budget.
async fn with_invocation_timeout<T>(
    tool: &str,
    budget: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ToolClientError> {
    match timeout(budget, call).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => Err(map_service_error(tool, err)),
        Err(_) => Err(ToolClientError::timeout(
            format!("tools/call {tool}"),
            budget.as_millis().try_into().unwrap_or(u64::MAX),
        )),
    }
}

/// Split server-reported JSON-RPC errors from transport failures.
fn map_service_error(tool_name: &str, err: ServiceError) -> ToolClientError {
    match err {
        ServiceError::McpError(data) => ToolClientError::Protocol {
            tool_name: tool_name.to_string(),
            code: data.code.0,
            message: data.message.to_string(),
            data: data.data,
        },
        other => ToolClientError::transport(tool_name, other.to_string()),
    }
}
