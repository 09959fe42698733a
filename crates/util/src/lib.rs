//! Utility helpers shared by the MDC runner crates.

pub mod text_processing;

pub use text_processing::{SecretMasker, is_sensitive_name, redact_json_value, redact_sensitive};
