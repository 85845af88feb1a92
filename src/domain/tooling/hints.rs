//! Short tool hints for the inline strategy.
//!
//! Instead of the full tool content, the main generation only learns which
//! tools exist and how to request one with a marker. The full content is
//! used later by the nested call that resolves the marker.

use super::marker::UNSUPPORTED_TAG;
use super::ToolPrompt;

/// Limits applied when rendering hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintOptions {
    /// Descriptions longer than this many characters are cut and get `...`.
    pub max_description_chars: usize,
    /// Maximum number of example markers.
    pub max_examples: usize,
}

impl Default for HintOptions {
    fn default() -> Self {
        Self {
            max_description_chars: 400,
            max_examples: 2,
        }
    }
}

/// Example requests keyed by a fragment of the command name.
const EXAMPLES: &[(&str, &str)] = &[
    ("graph", "Plot y = sin(x) from 0 to 2π"),
    ("flow", "Show the steps for solving a quadratic equation as a flowchart"),
    ("diagram", "Diagram the relation between a triangle's incenter and circumcenter"),
    ("scene", "Visualize the volume formula of a cylinder in 3D"),
];

/// Renders the inline-mode hint block. Empty input yields an empty string.
pub fn build_tool_hints(tools: &[ToolPrompt], options: &HintOptions) -> String {
    if tools.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "[Available Visualization Tools]".to_string(),
        "When a visualization would help, request it with the format below:".to_string(),
        String::new(),
    ];

    for tool in tools {
        let command = tool.bare_command();
        let title = if tool.title.trim().is_empty() {
            command
        } else {
            tool.title.as_str()
        };
        let description = truncate_chars(
            tool.short_description.as_deref().unwrap_or_default(),
            options.max_description_chars,
        );
        lines.push(format!("- {}: {}", title, description));
        lines.push(format!(
            "  Format: <{cmd}>description of what to visualize</{cmd}>",
            cmd = command
        ));
    }

    let examples: Vec<String> = tools
        .iter()
        .take(options.max_examples)
        .filter_map(|tool| {
            let command = tool.bare_command();
            let lowered = command.to_lowercase();
            EXAMPLES
                .iter()
                .find(|(keyword, _)| lowered.contains(keyword))
                .map(|(_, request)| format!("<{cmd}>{}</{cmd}>", request, cmd = command))
        })
        .collect();

    if !examples.is_empty() {
        lines.push(String::new());
        lines.push("Examples:".to_string());
        lines.extend(examples);
    }

    lines.extend([
        String::new(),
        format!(
            "If a requested visualization turns out to be impossible, emit {} tool=\"command\" reason=\"why\"/> instead and keep explaining.",
            UNSUPPORTED_TAG
        ),
        "Important: use a tool only when a visualization helps understanding.".to_string(),
        "Tool output is generated separately and inserted into the response.".to_string(),
    ]);

    lines.join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tools_yield_empty_hints() {
        assert_eq!(build_tool_hints(&[], &HintOptions::default()), "");
    }

    #[test]
    fn lists_format_line_without_leading_slash() {
        let tools = vec![ToolPrompt::new("/base-graph-spec", "Function Graph", "FULL")
            .unwrap()
            .with_short_description("Plots functions")];
        let hints = build_tool_hints(&tools, &HintOptions::default());

        assert!(hints.contains("- Function Graph: Plots functions"));
        assert!(hints.contains("  Format: <base-graph-spec>description of what to visualize</base-graph-spec>"));
        assert!(!hints.contains("FULL"));
    }

    #[test]
    fn examples_follow_command_keywords_and_limit() {
        let tools = vec![
            ToolPrompt::new("graph-spec", "G", "x").unwrap(),
            ToolPrompt::new("flow-spec", "F", "x").unwrap(),
            ToolPrompt::new("scene-spec", "S", "x").unwrap(),
        ];
        let hints = build_tool_hints(&tools, &HintOptions::default());

        assert!(hints.contains("<graph-spec>Plot y = sin(x) from 0 to 2π</graph-spec>"));
        assert!(hints.contains("<flow-spec>Show the steps"));
        assert!(!hints.contains("<scene-spec>Visualize"));
    }

    #[test]
    fn mentions_unsupported_marker() {
        let tools = vec![ToolPrompt::new("graph", "G", "x").unwrap()];
        let hints = build_tool_hints(&tools, &HintOptions::default());
        assert!(hints.contains("<tool-unsupported tool=\"command\" reason=\"why\"/>"));
    }

    #[test]
    fn long_descriptions_are_truncated_by_characters() {
        let tools = vec![ToolPrompt::new("graph", "G", "x")
            .unwrap()
            .with_short_description("가".repeat(10))];
        let options = HintOptions {
            max_description_chars: 4,
            max_examples: 0,
        };
        let hints = build_tool_hints(&tools, &options);
        assert!(hints.contains("- G: 가가가가..."));
    }

    #[test]
    fn title_falls_back_to_command() {
        let tools = vec![ToolPrompt::new("/scene", "", "x").unwrap()];
        let hints = build_tool_hints(&tools, &HintOptions::default());
        assert!(hints.contains("- scene: "));
    }
}
