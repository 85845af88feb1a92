//! Stage 1 selection response parsing.
//!
//! The selection call asks the model for a raw JSON object, but models wrap it
//! in code fences or prose often enough that the parser has to dig for it.
//! Parsing never fails: unusable output degrades to a direct answer.

use serde_json::Value;

/// Result of parsing a Stage 1 response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDecision {
    /// Selected tool commands, in the order the model listed them, deduplicated.
    pub selected_commands: Vec<String>,
    /// Answer the model gave when it chose no tools.
    pub direct_answer: Option<String>,
}

impl SelectionDecision {
    /// Decision for output that could not be parsed: no tools, raw text as answer.
    pub fn unparsed(raw: impl Into<String>) -> Self {
        Self {
            selected_commands: Vec::new(),
            direct_answer: Some(raw.into()),
        }
    }

    /// True if at least one tool was selected.
    pub fn needs_tools(&self) -> bool {
        !self.selected_commands.is_empty()
    }
}

/// Parses a Stage 1 selection response.
///
/// 1. Strips one surrounding code fence (any language tag).
/// 2. Takes the first brace-delimited object with at most one nested level.
/// 3. Reads `need_tools` (a bare string counts as a one-element list; a
///    missing or mistyped value is an empty list) and `answer`.
///
/// When no object is found or it does not decode, the whole original text
/// becomes the direct answer.
pub fn parse_selection_response(response: &str) -> SelectionDecision {
    let unfenced = strip_code_fence(response.trim());

    let Some(candidate) = find_json_object(unfenced) else {
        return SelectionDecision::unparsed(response);
    };

    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) else {
        return SelectionDecision::unparsed(response);
    };

    let mut selected_commands: Vec<String> = Vec::new();
    let requested = match object.get("need_tools") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };
    for command in requested {
        let command = command.trim().to_string();
        if !command.is_empty() && !selected_commands.contains(&command) {
            selected_commands.push(command);
        }
    }

    let direct_answer = match object.get("answer") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    };

    SelectionDecision {
        selected_commands,
        direct_answer,
    }
}

/// Removes a leading ```` ```tag ```` line and a trailing ```` ``` ````.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let rest = rest.trim_start();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim_end()
}

/// Finds the leftmost `{...}` span nesting at most one inner object.
///
/// A start whose span would need deeper nesting, or never closes, is skipped
/// and the search resumes at the next `{`.
fn find_json_object(text: &str) -> Option<&str> {
    const MAX_DEPTH: usize = 2;

    for (start, _) in text.match_indices('{') {
        let mut depth = 0usize;
        for (offset, c) in text[start..].char_indices() {
            match c {
                '{' => {
                    depth += 1;
                    if depth > MAX_DEPTH {
                        break;
                    }
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + offset + 1]);
                    }
                }
                _ => {}
            }
        }
    }
    None
}
