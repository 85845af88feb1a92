//! File-based tool catalog.
//!
//! Reads tool definitions from a YAML file on every lookup, so edits take
//! effect without a restart:
//!
//! ```yaml
//! - command: /base-graph-spec
//!   title: Function Graph
//!   short_description: Plots functions and data
//!   priority: 5
//!   groups: [math]
//!   content: |
//!     You produce graph specifications...
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::tooling::{marker_key, ToolPrompt};
use crate::ports::{ToolPromptSource, ToolSourceError};

#[derive(Debug, Deserialize)]
struct ToolRecord {
    command: String,
    #[serde(default)]
    title: String,
    content: String,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    groups: Vec<String>,
}

/// YAML-backed tool prompt source.
#[derive(Debug, Clone)]
pub struct YamlToolCatalog {
    path: PathBuf,
}

impl YamlToolCatalog {
    /// Create a catalog reading from `path`
    ///
    /// # Example
    /// ```ignore
    /// let catalog = YamlToolCatalog::new("./config/tools.yaml");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_records(&self) -> Result<Vec<ToolRecord>, ToolSourceError> {
        let yaml = fs::read_to_string(&self.path).await.map_err(|e| {
            ToolSourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&yaml).map_err(|e| ToolSourceError::Invalid(e.to_string()))
    }
}

#[async_trait]
impl ToolPromptSource for YamlToolCatalog {
    async fn tool_prompts(&self, group: Option<&str>) -> Result<Vec<ToolPrompt>, ToolSourceError> {
        let records = self.load_records().await?;

        let mut seen = HashSet::new();
        let mut prompts = Vec::new();
        for record in records {
            if !seen.insert(marker_key(&record.command)) {
                return Err(ToolSourceError::DuplicateCommand {
                    command: record.command,
                });
            }

            if let Some(group) = group {
                if !record.groups.iter().any(|g| g == group) {
                    continue;
                }
            }

            let mut prompt = ToolPrompt::new(record.command, record.title, record.content)
                .map_err(|e| ToolSourceError::Invalid(e.to_string()))?
                .with_priority(record.priority);
            if let Some(description) = record.short_description {
                prompt = prompt.with_short_description(description);
            }
            prompts.push(prompt);
        }

        tracing::debug!(
            path = %self.path.display(),
            group = group.unwrap_or("*"),
            count = prompts.len(),
            "loaded tool catalog"
        );
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
- command: /base-graph-spec
  title: Function Graph
  short_description: Plots functions
  priority: 5
  groups: [math]
  content: GRAPH CONTENT
- command: flow-spec
  title: Flowchart
  content: FLOW CONTENT
"#;

    async fn catalog_with(content: &str) -> (TempDir, YamlToolCatalog) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.yaml");
        fs::write(&path, content).await.unwrap();
        (dir, YamlToolCatalog::new(path))
    }

    #[tokio::test]
    async fn loads_all_tools() {
        let (_dir, catalog) = catalog_with(CATALOG).await;

        let tools = catalog.tool_prompts(None).await.unwrap();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].command, "/base-graph-spec");
        assert_eq!(tools[0].priority, 5);
        assert_eq!(tools[0].short_description.as_deref(), Some("Plots functions"));
        assert_eq!(tools[1].priority, 0);
        assert_eq!(tools[1].short_description, None);
    }

    #[tokio::test]
    async fn filters_by_group() {
        let (_dir, catalog) = catalog_with(CATALOG).await;

        let tools = catalog.tool_prompts(Some("math")).await.unwrap();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].title, "Function Graph");
    }

    #[tokio::test]
    async fn rejects_duplicate_commands_after_normalization() {
        let (_dir, catalog) = catalog_with(
            "- {command: /graph, content: a}\n- {command: GRAPH, content: b}\n",
        )
        .await;

        let result = catalog.tool_prompts(None).await;

        assert!(matches!(
            result,
            Err(ToolSourceError::DuplicateCommand { command }) if command == "GRAPH"
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_command() {
        let (_dir, catalog) = catalog_with("- {command: \"bad cmd\", content: a}\n").await;
        let result = catalog.tool_prompts(None).await;
        assert!(matches!(result, Err(ToolSourceError::Invalid(_))));
    }

    #[tokio::test]
    async fn malformed_yaml_is_invalid() {
        let (_dir, catalog) = catalog_with("- command: [unclosed").await;
        let result = catalog.tool_prompts(None).await;
        assert!(matches!(result, Err(ToolSourceError::Invalid(_))));
    }

    #[tokio::test]
    async fn empty_file_has_no_tools() {
        let (_dir, catalog) = catalog_with("").await;
        assert!(catalog.tool_prompts(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let catalog = YamlToolCatalog::new("/nonexistent/tools.yaml");
        let result = catalog.tool_prompts(None).await;
        assert!(matches!(result, Err(ToolSourceError::Unavailable(_))));
    }
}
