//! # Text Processing Utilities
//!
//! Redaction helpers applied to anything the runner logs or reports: command parameters,
//! rendered errors, and server stderr. Scripts routinely carry session material through their
//! variables, so both pattern-based and value-based masking are provided.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const REDACTED: &str = "[REDACTED]";

/// Values shorter than this are never masked by value; masking `"1"` everywhere would destroy logs.
const MIN_MASKED_VALUE_LENGTH: usize = 4;

/// Name fragments that mark a variable or JSON key as carrying a credential.
const SENSITIVE_NAME_FRAGMENTS: &[&str] = &[
    "authorization",
    "cookie",
    "credential",
    "jwt",
    "passcode",
    "passphrase",
    "password",
    "private_key",
    "secret",
    "session",
    "token",
    "api_key",
    "apikey",
    "access_key",
];

/// Redacts values that look like secrets in a string.
///
/// # Example
/// ```rust
/// use mdc_util::redact_sensitive;
///
/// let input = "API_KEY=abc123 TOKEN=xyz789";
/// assert_eq!(redact_sensitive(input), "API_KEY=[REDACTED] TOKEN=[REDACTED]");
///
/// let input = "Authorization: Bearer secret123";
/// assert_eq!(redact_sensitive(input), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, REDACTED)
}

fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                if captures.get(2).is_some() {
                    format!("{prefix}{replacement}{suffix}")
                } else {
                    replacement.to_string()
                }
            })
            .to_string();
    }

    redacted
}

/// Returns true when a variable or key name suggests it holds a credential.
pub fn is_sensitive_name(name: &str) -> bool {
    let normalized = name.to_ascii_lowercase().replace('-', "_");
    SENSITIVE_NAME_FRAGMENTS.iter().any(|fragment| normalized.contains(fragment))
}

/// Recursively masks values stored under sensitive keys and redacts secret-looking strings.
pub fn redact_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, nested)| {
                    let masked = if is_sensitive_name(key) && !nested.is_null() {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_json_value(nested)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_json_value).collect()),
        Value::String(text) => Value::String(redact_sensitive(text)),
        other => other.clone(),
    }
}

/// Masks known secret values wherever they appear in text.
///
/// Built from run variables: every variable whose name looks sensitive contributes its value.
/// Pattern-based redaction alone cannot catch an opaque session id, so callers combine both via
/// [`SecretMasker::redact`].
#[derive(Debug, Clone, Default)]
pub struct SecretMasker {
    secrets: Vec<String>,
}

impl SecretMasker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the values of sensitive-looking variables.
    pub fn from_variables<'a, I>(variables: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut masker = Self::new();
        for (name, value) in variables {
            if is_sensitive_name(name) {
                masker.add_secret(value);
            }
        }
        masker
    }

    pub fn add_secret(&mut self, value: &str) {
        if value.len() >= MIN_MASKED_VALUE_LENGTH && !self.secrets.iter().any(|known| known == value) {
            self.secrets.push(value.to_string());
            // Longest first so a secret that contains another is masked whole.
            self.secrets.sort_by_key(|secret| std::cmp::Reverse(secret.len()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Apply value masking followed by pattern-based redaction.
    pub fn redact(&self, input: &str) -> String {
        let mut masked = input.to_string();
        for secret in &self.secrets {
            masked = masked.replace(secret.as_str(), REDACTED);
        }
        redact_sensitive(&masked)
    }

    /// JSON flavour of [`SecretMasker::redact`].
    pub fn redact_value(&self, value: &Value) -> Value {
        let masked = match value {
            Value::String(text) => Value::String(self.redact(text)),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.redact_value(item)).collect()),
            Value::Object(map) => Value::Object(map.iter().map(|(key, nested)| (key.clone(), self.redact_value(nested))).collect()),
            other => other.clone(),
        };
        redact_json_value(&masked)
    }
}

/// Returns compiled regex patterns for detecting sensitive information.
///
/// Ordered from most specific to most general.
pub fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    let mut patterns = Vec::new();
    patterns.extend(build_authorization_patterns());
    patterns.extend(build_assignment_patterns());
    patterns.extend(build_value_only_patterns());
    patterns
}

/// Captures authorization headers, cookies, and inline bearer/basic credentials.
fn build_authorization_patterns() -> Vec<Regex> {
    vec![
        Regex::new(r"(?i)(authorization:\s+)([^\s,;]+(?:\s+[^\s,;]+)?)").unwrap(),
        Regex::new(r"(?i)(cookie:\s+)([^\r\n]+)").unwrap(),
        Regex::new(r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)").unwrap(),
    ]
}

/// Detects `KEY=value` and `"key": "value"` assignments for credential-like keys.
fn build_assignment_patterns() -> Vec<Regex> {
    vec![
        Regex::new(r"(?i)\b([A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)").unwrap(),
        Regex::new(r#"(?i)("[A-Za-z0-9_.-]*(?:token|secret|password|api_?key|cookie)[A-Za-z0-9_.-]*"\s*:\s*")([^"]+)(")"#).unwrap(),
    ]
}

fn build_value_only_patterns() -> Vec<Regex> {
    vec![
        Regex::new(r"(eyJ[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+)").unwrap(),
        Regex::new(r"(?i)((?:gh[oprsu]|github_pat)_[A-Za-z0-9_]{22,40})").unwrap(),
        Regex::new(r"(?i)(sk_(?:live|test)_[A-Za-z0-9]{16,})").unwrap(),
        Regex::new(r"(?s)(-----BEGIN [^-]+-----[\s\S]+?-----END [^-]+-----)").unwrap(),
    ]
}
