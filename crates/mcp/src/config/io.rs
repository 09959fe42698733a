//! Configuration IO helpers for the launch configuration.

use crate::config::{ConfigError, LaunchConfig, interpolate_config, validate_config};
use dirs_next::config_dir;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the default path for the launch configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var("MDC_SERVER_CONFIG")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("mdc-runner").join("server.json")
}

/// Loads the launch configuration from the default path.
pub fn load_launch_config() -> Result<LaunchConfig, ConfigError> {
    load_launch_config_from_path(&default_config_path())
}

/// Loads, interpolates, and validates a launch configuration.
///
/// A missing file yields [`LaunchConfig::default`].
pub fn load_launch_config_from_path(path: &Path) -> Result<LaunchConfig, ConfigError> {
    if !path.exists() {
        return Ok(LaunchConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let mut config: LaunchConfig = serde_json::from_str(&content)?;
    interpolate_config(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}
