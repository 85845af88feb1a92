//! In-memory tool prompt source.
//!
//! Holds a fixed list of tools with optional group membership. Useful for
//! tests and for embedding a small built-in catalog.

use async_trait::async_trait;

use crate::domain::tooling::ToolPrompt;
use crate::ports::{ToolPromptSource, ToolSourceError};

#[derive(Debug, Clone)]
struct GroupedTool {
    prompt: ToolPrompt,
    groups: Vec<String>,
}

/// Fixed tool list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolPromptSource {
    tools: Vec<GroupedTool>,
    unavailable: Option<String>,
}

impl InMemoryToolPromptSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source serving `prompts` with no group membership.
    pub fn from_prompts(prompts: impl IntoIterator<Item = ToolPrompt>) -> Self {
        prompts
            .into_iter()
            .fold(Self::new(), |source, prompt| source.with_tool(prompt))
    }

    /// Adds a tool that belongs to no group.
    pub fn with_tool(self, prompt: ToolPrompt) -> Self {
        self.with_grouped_tool(prompt, Vec::<String>::new())
    }

    /// Adds a tool that belongs to `groups`.
    pub fn with_grouped_tool<I, S>(mut self, prompt: ToolPrompt, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.push(GroupedTool {
            prompt,
            groups: groups.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Makes every lookup fail with [`ToolSourceError::Unavailable`].
    pub fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }
}

#[async_trait]
impl ToolPromptSource for InMemoryToolPromptSource {
    async fn tool_prompts(&self, group: Option<&str>) -> Result<Vec<ToolPrompt>, ToolSourceError> {
        if let Some(reason) = &self.unavailable {
            return Err(ToolSourceError::Unavailable(reason.clone()));
        }

        Ok(self
            .tools
            .iter()
            .filter(|tool| group.map_or(true, |g| tool.groups.iter().any(|t| t == g)))
            .map(|tool| tool.prompt.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(command: &str) -> ToolPrompt {
        ToolPrompt::new(command, command, "content").unwrap()
    }

    #[tokio::test]
    async fn returns_all_tools_without_group() {
        let source = InMemoryToolPromptSource::new()
            .with_tool(prompt("graph"))
            .with_grouped_tool(prompt("flow"), ["math"]);

        let tools = source.tool_prompts(None).await.unwrap();
        assert_eq!(tools.len(), 2);
    }

    #[tokio::test]
    async fn filters_by_group() {
        let source = InMemoryToolPromptSource::new()
            .with_tool(prompt("graph"))
            .with_grouped_tool(prompt("flow"), ["math"]);

        let tools = source.tool_prompts(Some("math")).await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].command, "flow");

        assert!(source.tool_prompts(Some("art")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_source_fails() {
        let source = InMemoryToolPromptSource::from_prompts([prompt("graph")]).unavailable("down");
        let result = source.tool_prompts(None).await;
        assert!(matches!(result, Err(ToolSourceError::Unavailable(_))));
    }
}
