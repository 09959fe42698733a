//! Model Context Protocol (MCP) tool client for the MDC command runner.
//!
//! This crate owns everything that touches the tool server: the typed launch configuration,
//! spawning the stdio server process, the MCP handshake, tool listing and invocation, and
//! teardown. The engine only sees the [`ToolClient`] trait.

pub mod client;
pub mod config;
pub mod types;

pub use client::{EchoToolClient, McpToolClient, ToolClient};
pub use config::{ConfigError, LaunchConfig, default_config_path, load_launch_config, load_launch_config_from_path};
pub use types::{ConnectionStatus, ToolCapability, ToolClientError, ToolResponse};
