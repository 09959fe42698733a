//! Configuration validation for the launch configuration.

use crate::config::LaunchConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static ENV_KEY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env key regex should compile"));

/// Validate a launch configuration before it is used to spawn anything.
pub fn validate_config(config: &LaunchConfig) -> Result<(), ValidationError> {
    if config.command.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField {
            field: "command".to_string(),
        });
    }

    for key in config.env.keys() {
        validate_env_key(key)?;
    }

    if config.handshake_timeout_ms == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "handshakeTimeoutMs".to_string(),
        });
    }
    if config.invocation_timeout_ms == 0 {
        return Err(ValidationError::InvalidTimeout {
            field: "invocationTimeoutMs".to_string(),
        });
    }

    debug!("Validated launch configuration for {}", config.command);
    Ok(())
}

fn validate_env_key(key: &str) -> Result<(), ValidationError> {
    if !ENV_KEY_REGEX.is_match(key) {
        return Err(ValidationError::InvalidEnvKey {
            key: key.to_string(),
            reason: "Environment variable keys must start with a letter or underscore, followed by letters, numbers, or underscores"
                .to_string(),
        });
    }
    Ok(())
}

/// Validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field '{field}'")]
    MissingRequiredField { field: String },

    #[error("Invalid environment variable key '{key}': {reason}")]
    InvalidEnvKey { key: String, reason: String },

    #[error("'{field}' must be greater than zero")]
    InvalidTimeout { field: String },
}
