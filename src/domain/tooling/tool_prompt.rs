//! ToolPrompt - a named, orderable prompt fragment.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Leading character conventionally used to invoke prompts as slash commands.
const MARKER_PREFIX: char = '/';

/// A tool prompt as resolved for a single request.
///
/// `content` is the full prompt text and is only injected when the tool is
/// actually used; `short_description` is what the catalog and hints show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPrompt {
    /// Unique identifier, conventionally hyphenated (e.g. `/base-graph-spec`).
    pub command: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Full prompt text.
    pub content: String,
    /// Bounded-length summary for catalogs.
    #[serde(default)]
    pub short_description: Option<String>,
    /// Higher sorts first when tools are merged.
    #[serde(default)]
    pub priority: i32,
}

impl ToolPrompt {
    /// Creates a tool prompt, validating the command.
    ///
    /// The command must be non-empty once the leading `/` is stripped and may
    /// not contain whitespace or angle brackets, since it doubles as a marker
    /// tag name in streamed output.
    pub fn new(
        command: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let command = command.into();
        let bare = strip_marker_prefix(&command);
        if bare.is_empty() {
            return Err(ValidationError::empty_field("command"));
        }
        if bare
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>' || c == '"')
        {
            return Err(ValidationError::invalid_format(
                "command",
                "must not contain whitespace, quotes or angle brackets",
            ));
        }

        Ok(Self {
            command,
            title: title.into(),
            content: content.into(),
            short_description: None,
            priority: 0,
        })
    }

    /// Sets the short description.
    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = Some(description.into());
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Command with the leading marker character stripped.
    pub fn bare_command(&self) -> &str {
        strip_marker_prefix(&self.command)
    }

    /// Catalog description: short description, then title, then command.
    pub fn catalog_description(&self) -> &str {
        self.short_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(self.title.as_str()).filter(|t| !t.trim().is_empty()))
            .unwrap_or(self.command.as_str())
    }
}

/// Strips any leading `/` from a command.
pub fn strip_marker_prefix(command: &str) -> &str {
    command.trim_start_matches(MARKER_PREFIX)
}

/// Key under which a command is recognized in streamed markers.
pub fn marker_key(command: &str) -> String {
    strip_marker_prefix(command).to_lowercase()
}

/// Key used for tolerant lookup: case-folded, `_` treated as `-`.
pub fn fuzzy_key(command: &str) -> String {
    marker_key(command).replace('_', "-")
}
