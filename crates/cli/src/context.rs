//! `--context` JSON parsing.

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use mdc_types::RunContext;
use serde_json::Value;

/// Parse the `--context` argument.
///
/// Accepts `{"variables": {...}}` or a flat object of variables. Scalars are stringified;
/// `null` becomes an empty string. Nested objects and arrays are rejected.
pub fn parse_context(raw: &str) -> Result<RunContext> {
    let value: Value = serde_json::from_str(raw).context("--context is not valid JSON")?;
    let Value::Object(mut root) = value else {
        bail!("--context must be a JSON object");
    };

    let variables = match root.remove("variables") {
        Some(Value::Object(variables)) if root.is_empty() => variables,
        Some(Value::Object(_)) => bail!("--context has fields besides \"variables\""),
        Some(_) => bail!("--context \"variables\" must be an object"),
        None => root,
    };

    let mut context = IndexMap::with_capacity(variables.len());
    for (name, value) in variables {
        let text = match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::Array(_) | Value::Object(_) => bail!("--context variable '{name}' must be a string, number, or boolean"),
        };
        context.insert(name, text);
    }
    Ok(RunContext::from(context))
}
