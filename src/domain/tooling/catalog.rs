//! Tool catalog for the Stage 1 selection prompt.

use super::ToolPrompt;

/// Header line of the catalog section.
const CATALOG_HEADER: &str = "[Available Tools]";

/// Builds a compact listing of tools: one `- command: description` line each.
///
/// Returns an empty string for an empty list; callers treat that as "no
/// catalog section".
pub fn build_tool_catalog(tools: &[ToolPrompt]) -> String {
    if tools.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(tools.len() + 1);
    lines.push(CATALOG_HEADER.to_string());
    for tool in tools {
        lines.push(format!("- {}: {}", tool.command, tool.catalog_description()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_catalog() {
        assert_eq!(build_tool_catalog(&[]), "");
    }

    #[test]
    fn lists_each_tool_with_best_description() {
        let tools = vec![
            ToolPrompt::new("base-graph-spec", "Graph", "full")
                .unwrap()
                .with_short_description("Plots a function"),
            ToolPrompt::new("flow-spec", "Flowchart", "full").unwrap(),
            ToolPrompt::new("scene-spec", "", "full").unwrap(),
        ];

        assert_eq!(
            build_tool_catalog(&tools),
            "[Available Tools]\n\
             - base-graph-spec: Plots a function\n\
             - flow-spec: Flowchart\n\
             - scene-spec: scene-spec"
        );
    }

    #[test]
    fn catalog_never_includes_full_content() {
        let tools = vec![ToolPrompt::new("graph", "Graph", "SECRET FULL CONTENT").unwrap()];
        assert!(!build_tool_catalog(&tools).contains("SECRET FULL CONTENT"));
    }
}
