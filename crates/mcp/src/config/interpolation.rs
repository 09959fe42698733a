//! Configuration interpolation for environment variables.

use crate::config::LaunchConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static ENV_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{env:([\w+_-]*)}").expect("env pattern should compile"));

/// Interpolate `${env:NAME}` references in the launch configuration.
///
/// Only `env` values and `args` are interpolated; the command itself is taken literally.
pub fn interpolate_config(config: &mut LaunchConfig) -> Result<(), InterpolationError> {
    for (key, value) in config.env.iter_mut() {
        *value = interpolate_string(value)?;
        debug!("Interpolated environment entry: {}", key);
    }
    for arg in config.args.iter_mut() {
        *arg = interpolate_string(arg)?;
    }
    Ok(())
}

/// Interpolate a string value, replacing `${env:NAME}` patterns.
pub fn interpolate_string(value: &str) -> Result<String, InterpolationError> {
    let mut resolved = Vec::new();
    for cap in ENV_PATTERN.captures_iter(value) {
        let var_name = cap[1].to_string();
        let env_value = std::env::var(&var_name).map_err(|_| InterpolationError::MissingEnvVar { name: var_name.clone() })?;
        debug!("Interpolated env var: {} -> [REDACTED]", var_name);
        resolved.push((cap[0].to_string(), env_value));
    }

    let mut result = value.to_string();
    for (placeholder, env_value) in resolved {
        result = result.replace(&placeholder, &env_value);
    }
    Ok(result)
}

/// Errors that can occur during interpolation.
#[derive(Debug, Error, Clone)]
pub enum InterpolationError {
    #[error("Missing environment variable: {name}")]
    MissingEnvVar { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_env_references() {
        temp_env::with_var("MDC_TEST_BROWSER", Some("chromium"), || {
            let value = interpolate_string("--browser=${env:MDC_TEST_BROWSER}").expect("interpolates");
            assert_eq!(value, "--browser=chromium");
        });
    }

    #[test]
    fn missing_env_var_is_an_error() {
        temp_env::with_var_unset("MDC_TEST_UNSET", || {
            let err = interpolate_string("${env:MDC_TEST_UNSET}").unwrap_err();
            assert!(matches!(err, InterpolationError::MissingEnvVar { ref name } if name == "MDC_TEST_UNSET"));
        });
    }

    #[test]
    fn interpolates_env_values_and_args() {
        temp_env::with_var("MDC_TEST_PROFILE", Some("/tmp/profile"), || {
            let mut config = LaunchConfig::new("npx").with_args(["--user-data-dir=${env:MDC_TEST_PROFILE}"]);
            config.env.insert("PROFILE".into(), "${env:MDC_TEST_PROFILE}".into());

            interpolate_config(&mut config).expect("interpolates");
            assert_eq!(config.args[0], "--user-data-dir=/tmp/profile");
            assert_eq!(config.env["PROFILE"], "/tmp/profile");
        });
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(interpolate_string("plain").unwrap(), "plain");
    }
}
