//! Core types for the MCP tool client.

pub mod errors;
pub mod status;
pub mod tools;

pub use errors::ToolClientError;
pub use status::ConnectionStatus;
pub use tools::{ToolCapability, ToolResponse};
