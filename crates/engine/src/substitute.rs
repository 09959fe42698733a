//! `{{name}}` template substitution over raw script text.
//!
//! Substitution is purely textual and runs before any structural parsing, so a token resolves
//! the same way whether it sits in prose, a JSON string, or an embedded script body.

use indexmap::IndexMap;
use serde_json::Value;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A `{{name}}` token still present in a command's parameters after substitution.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnresolvedToken {
    /// JSON path where the token was found, for example `params.url`.
    pub source_path: String,
    /// Variable name without delimiters.
    pub name: String,
}

/// Substituted script text plus, for each of its lines, the 1-based line it came from.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SubstitutedText {
    pub text: String,
    pub line_origins: Vec<usize>,
}

impl SubstitutedText {
    /// Original line for a 1-based line of the substituted text.
    pub fn origin_of(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|index| self.line_origins.get(index))
            .copied()
            .unwrap_or(line)
    }
}

/// Substitute line by line so positions in the output can be traced back to the input.
///
/// Token names never span lines, so the text equals [`substitute`] over the whole input
/// (apart from line terminators, which are normalized to `\n`).
pub fn substitute_lines(raw_text: &str, variables: &IndexMap<String, String>) -> SubstitutedText {
    let mut substituted = SubstitutedText::default();
    for (index, line) in raw_text.lines().enumerate() {
        let replaced = substitute(line, variables);
        let produced = replaced.split('\n').count();
        substituted.line_origins.extend(std::iter::repeat_n(index + 1, produced));
        if index > 0 {
            substituted.text.push('\n');
        }
        substituted.text.push_str(&replaced);
    }
    substituted
}

/// Replace every `{{name}}` occurrence whose name is present in `variables`.
///
/// Unknown names are left verbatim. Substituted values are never re-scanned.
pub fn substitute(raw_text: &str, variables: &IndexMap<String, String>) -> String {
    let mut output = String::with_capacity(raw_text.len());
    let mut remainder = raw_text;

    while let Some(start) = remainder.find(OPEN) {
        output.push_str(&remainder[..start]);
        let after_open = &remainder[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            output.push_str(&remainder[start..]);
            return output;
        };

        let inner = &after_open[..end];
        if !is_token_name(inner) {
            // Not a token; emit one brace and rescan so `{{{x}}}` still resolves the inner `{{x}}`.
            output.push('{');
            remainder = &remainder[start + 1..];
            continue;
        }

        let token_end = start + OPEN.len() + end + CLOSE.len();
        match variables.get(inner.trim()) {
            Some(value) => output.push_str(value),
            None => output.push_str(&remainder[start..token_end]),
        }
        remainder = &remainder[token_end..];
    }

    output.push_str(remainder);
    output
}

/// Names of every well-formed `{{name}}` token in `text`, in order of appearance.
pub fn extract_token_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut remainder = text;

    while let Some(start) = remainder.find(OPEN) {
        let after_open = &remainder[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let inner = &after_open[..end];
        if is_token_name(inner) {
            names.push(inner.trim().to_string());
            remainder = &after_open[end + CLOSE.len()..];
        } else {
            remainder = &remainder[start + 1..];
        }
    }

    names
}

/// Collect leftover tokens from an arbitrary JSON value tree.
pub fn find_unresolved_tokens(value: &Value, source_path: &str) -> Vec<UnresolvedToken> {
    let mut unresolved = Vec::new();
    collect_unresolved(value, source_path, &mut unresolved);
    unresolved
}

fn collect_unresolved(value: &Value, source_path: &str, unresolved: &mut Vec<UnresolvedToken>) {
    match value {
        Value::String(text) => {
            for name in extract_token_names(text) {
                unresolved.push(UnresolvedToken {
                    source_path: source_path.to_string(),
                    name,
                });
            }
        }
        Value::Array(values) => {
            for (index, nested) in values.iter().enumerate() {
                collect_unresolved(nested, format!("{source_path}[{index}]").as_str(), unresolved);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                collect_unresolved(nested, format!("{source_path}.{key}").as_str(), unresolved);
            }
        }
        _ => {}
    }
}

/// Any brace-free, single-line, non-blank text between the delimiters names a variable.
fn is_token_name(inner: &str) -> bool {
    !inner.trim().is_empty() && !inner.contains(['{', '}', '\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let variables = vars(&[("host", "example.com")]);
        let text = "visit {{host}} then https://{{host}}/page";
        assert_eq!(substitute(text, &variables), "visit example.com then https://example.com/page");
    }

    #[test]
    fn leaves_unknown_tokens_verbatim() {
        let variables = vars(&[("host", "example.com")]);
        assert_eq!(substitute("{{host}} {{user}}", &variables), "example.com {{user}}");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let variables = vars(&[("Host", "example.com")]);
        assert_eq!(substitute("{{host}}", &variables), "{{host}}");
    }

    #[test]
    fn whitespace_inside_braces_is_ignored() {
        let variables = vars(&[("host", "example.com")]);
        assert_eq!(substitute("{{ host }}", &variables), "example.com");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let variables = indexmap! {
            "a".to_string() => "{{b}}".to_string(),
            "b".to_string() => "nope".to_string(),
        };
        assert_eq!(substitute("{{a}}", &variables), "{{b}}");
    }

    #[test]
    fn any_context_key_can_be_substituted() {
        let variables = vars(&[("user name", "ada"), ("login:email", "ada@example.com"), ("straße", "Hauptstraße 1")]);
        assert_eq!(
            substitute("{{user name}} {{login:email}} {{ straße }}", &variables),
            "ada ada@example.com Hauptstraße 1"
        );
    }

    #[test]
    fn braces_and_line_breaks_do_not_form_names() {
        let variables = vars(&[("a}b", "no"), ("x", "1")]);
        assert_eq!(substitute("{{a}b}} {{x}}", &variables), "{{a}b}} 1");
        assert_eq!(substitute("{{\nx}}", &variables), "{{\nx}}");
        assert_eq!(substitute("{{  }}", &variables), "{{  }}");
    }

    #[test]
    fn line_origins_survive_multi_line_values() {
        let variables = vars(&[("banner", "a\nb\nc")]);
        let substituted = substitute_lines("{{banner}}\n```mcp\nbody\n```", &variables);

        assert_eq!(substituted.text, "a\nb\nc\n```mcp\nbody\n```");
        assert_eq!(substituted.line_origins, vec![1, 1, 1, 2, 3, 4]);
        assert_eq!(substituted.origin_of(4), 2);
        assert_eq!(substituted.text, substitute("{{banner}}\n```mcp\nbody\n```", &variables));
    }

    #[test]
    fn triple_braces_resolve_inner_token() {
        let variables = vars(&[("x", "1")]);
        assert_eq!(substitute("{{{x}}}", &variables), "{1}");
    }

    #[test]
    fn unterminated_token_is_kept() {
        let variables = vars(&[("x", "1")]);
        assert_eq!(substitute("before {{x", &variables), "before {{x");
    }

    #[test]
    fn empty_context_is_a_no_op_twice() {
        let text = "```mcp\n{\"tool\":\"t\",\"params\":{\"v\":\"{{missing}}\"}}\n```";
        let empty = IndexMap::new();
        let once = substitute(text, &empty);
        assert_eq!(once, text);
        assert_eq!(substitute(&once, &empty), text);
    }

    #[test]
    fn finds_unresolved_tokens_with_paths() {
        let params = json!({"url": "https://{{host}}/", "fields": [{"value": "{{user}}"}], "n": 1});
        let mut unresolved = find_unresolved_tokens(&params, "params");
        unresolved.sort_by(|a, b| a.source_path.cmp(&b.source_path));

        assert_eq!(
            unresolved,
            vec![
                UnresolvedToken {
                    source_path: "params.fields[0].value".into(),
                    name: "user".into()
                },
                UnresolvedToken {
                    source_path: "params.url".into(),
                    name: "host".into()
                },
            ]
        );
    }
}
