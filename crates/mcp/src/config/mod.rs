//! Launch configuration for the tool server process.
//! This module handles parsing, interpolation, and validation of the
//! `server.json` file that describes how to spawn the MCP server.

mod interpolation;
mod io;
mod model;
mod validation;

pub use interpolation::{InterpolationError, interpolate_config, interpolate_string};
pub use io::{default_config_path, load_launch_config, load_launch_config_from_path};
pub use model::{ConfigError, DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_INVOCATION_TIMEOUT_MS, LaunchConfig};
pub use validation::{ValidationError, validate_config};
