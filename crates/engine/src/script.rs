//! MDC script parsing.
//!
//! A script is Markdown-like prose with fenced blocks. Only blocks tagged `mcp` (or `mcp-tool`)
//! are executable; each holds one JSON object:
//!
//! ````text
//! ```mcp
//! { "tool": "browser_navigate", "params": { "url": "https://example.com" }, "optional": false }
//! ```
//! ````
//!
//! Malformed blocks are dropped with a [`ScriptDiagnostic`]; they never abort the parse.

use std::fmt;

use mdc_types::ToolCommand;
use serde_json::{Map as JsonMap, Value};

/// Fence marker opening and closing every block.
pub const FENCE: &str = "```";
/// Language tags that mark a block as executable, compared case-insensitively.
pub const TOOL_BLOCK_TAGS: &[&str] = &["mcp", "mcp-tool"];

/// Commands extracted from a script plus the warnings produced along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScript {
    /// Commands in the order their blocks appear.
    pub commands: Vec<ToolCommand>,
    pub diagnostics: Vec<ScriptDiagnostic>,
}

/// A dropped block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDiagnostic {
    /// Line of the block's opening fence.
    pub line: usize,
    /// Tool name, when the block got far enough to name one.
    pub tool: Option<String>,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    InvalidJson { message: String },
    NotAnObject,
    MissingTool,
    InvalidParams,
    InvalidOptional,
    Unterminated,
}

impl fmt::Display for ScriptDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        if let Some(tool) = &self.tool {
            write!(f, "tool '{tool}': ")?;
        }
        match &self.kind {
            DiagnosticKind::InvalidJson { message } => write!(f, "block skipped, invalid JSON ({message})"),
            DiagnosticKind::NotAnObject => write!(f, "block skipped, body is not a JSON object"),
            DiagnosticKind::MissingTool => write!(f, "block skipped, missing or empty \"tool\""),
            DiagnosticKind::InvalidParams => write!(f, "block skipped, \"params\" must be an object"),
            DiagnosticKind::InvalidOptional => write!(f, "block skipped, \"optional\" must be a boolean"),
            DiagnosticKind::Unterminated => write!(f, "block skipped, fence is never closed"),
        }
    }
}

impl ParsedScript {
    /// Rewrite every line number through `origin_of`, for text that was produced from another.
    pub fn map_lines(mut self, origin_of: impl Fn(usize) -> usize) -> Self {
        for command in &mut self.commands {
            command.source_line = origin_of(command.source_line);
        }
        for diagnostic in &mut self.diagnostics {
            diagnostic.line = origin_of(diagnostic.line);
        }
        self
    }
}

enum BlockState<'a> {
    Outside,
    Documentation,
    ToolBlock { opened_at: usize, body: Vec<&'a str> },
}

/// Extract tool commands from substituted script text.
///
/// Deterministic: the same input always yields the same commands and diagnostics.
pub fn parse_script(text: &str) -> ParsedScript {
    let mut parsed = ParsedScript::default();
    let mut state = BlockState::Outside;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        state = match state {
            BlockState::Outside => match trimmed.strip_prefix(FENCE) {
                Some(tag) if is_tool_tag(tag.trim()) => BlockState::ToolBlock {
                    opened_at: line_number,
                    body: Vec::new(),
                },
                Some(_) => BlockState::Documentation,
                None => BlockState::Outside,
            },
            BlockState::Documentation if trimmed == FENCE => BlockState::Outside,
            BlockState::Documentation => BlockState::Documentation,
            BlockState::ToolBlock { opened_at, body } if trimmed == FENCE => {
                match parse_block(&body.join("\n"), opened_at) {
                    Ok(command) => parsed.commands.push(command),
                    Err(diagnostic) => parsed.diagnostics.push(diagnostic),
                }
                BlockState::Outside
            }
            BlockState::ToolBlock { opened_at, mut body } => {
                body.push(line);
                BlockState::ToolBlock { opened_at, body }
            }
        };
    }

    if let BlockState::ToolBlock { opened_at, .. } = state {
        parsed.diagnostics.push(ScriptDiagnostic {
            line: opened_at,
            tool: None,
            kind: DiagnosticKind::Unterminated,
        });
    }

    parsed
}

fn is_tool_tag(tag: &str) -> bool {
    TOOL_BLOCK_TAGS.iter().any(|known| known.eq_ignore_ascii_case(tag))
}

fn parse_block(body: &str, line: usize) -> Result<ToolCommand, ScriptDiagnostic> {
    let diagnostic = |tool: Option<&str>, kind| ScriptDiagnostic {
        line,
        tool: tool.map(str::to_string),
        kind,
    };

    let value: Value = serde_json::from_str(body).map_err(|err| {
        diagnostic(
            None,
            DiagnosticKind::InvalidJson {
                message: err.to_string(),
            },
        )
    })?;
    let Value::Object(mut object) = value else {
        return Err(diagnostic(None, DiagnosticKind::NotAnObject));
    };

    let tool = match object.remove("tool") {
        Some(Value::String(tool)) if !tool.trim().is_empty() => tool.trim().to_string(),
        _ => return Err(diagnostic(None, DiagnosticKind::MissingTool)),
    };

    let params = match object.remove("params") {
        None | Some(Value::Null) => JsonMap::new(),
        Some(Value::Object(params)) => params,
        Some(_) => return Err(diagnostic(Some(&tool), DiagnosticKind::InvalidParams)),
    };

    let optional = match object.remove("optional") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(optional)) => optional,
        Some(_) => return Err(diagnostic(Some(&tool), DiagnosticKind::InvalidOptional)),
    };

    Ok(ToolCommand::new(tool, line).with_params(params).optional(optional))
}
