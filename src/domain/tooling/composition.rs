//! System prompt composition for the gating and concat strategies.

use super::tool_prompt::strip_marker_prefix;
use super::ToolPrompt;

/// Instruction block appended to the Stage 1 system prompt.
pub const SELECTION_INSTRUCTIONS: &str = r#"---
[IMPORTANT: Tool Selection Instructions]
Before answering the user's question, determine if any of the above tools are needed.

Respond with ONLY a raw JSON object (no formatting):
- If tools needed: {"need_tools": ["tool-command-1", "tool-command-2"], "reason": "brief reason"}
- If no tools needed: {"need_tools": [], "answer": "Your direct answer here"}

CRITICAL OUTPUT FORMAT RULES:
1. Output ONLY the raw JSON object starting with { and ending with }
2. Do NOT wrap in markdown code blocks (no ```json or ```)
3. Do NOT add any text before or after the JSON
4. Start your response directly with the opening brace {"#;

/// Builds the Stage 1 system prompt: base, catalog, selection instructions.
pub fn build_selection_system_prompt(base_system: &str, tool_catalog: &str) -> String {
    join_sections([base_system, tool_catalog, SELECTION_INSTRUCTIONS])
}

/// Filters tools to the selected commands.
///
/// Both sides have the leading marker character stripped; the comparison is
/// otherwise exact and case-sensitive. Tool order is preserved.
pub fn select_by_commands<'a>(tools: &'a [ToolPrompt], selected: &[String]) -> Vec<&'a ToolPrompt> {
    let wanted: Vec<&str> = selected.iter().map(|c| strip_marker_prefix(c)).collect();
    tools
        .iter()
        .filter(|tool| wanted.contains(&tool.bare_command()))
        .collect()
}

/// Appends the full content of `tools` to the base prompt.
///
/// Tools are ordered by descending priority (stable for equal priorities) and
/// separated by blank lines. With no tools the base prompt is returned as is.
pub fn compose_with_tools(base_system: &str, tools: &[&ToolPrompt]) -> String {
    if tools.is_empty() {
        return base_system.to_string();
    }

    let mut ordered: Vec<&ToolPrompt> = tools.to_vec();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    let contents = ordered
        .iter()
        .map(|tool| tool.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    join_sections([base_system, contents.as_str()])
}

fn join_sections<'a>(sections: impl IntoIterator<Item = &'a str>) -> String {
    sections
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
