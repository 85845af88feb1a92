//! ToolSet - immutable lookup of active tools by normalized command.

use std::collections::BTreeMap;

use super::tool_prompt::{fuzzy_key, marker_key, ToolPrompt};

/// A tool as seen by the inline engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    /// Command as configured (leading marker character kept).
    pub command: String,
    /// Human-readable title.
    pub title: String,
    /// Full prompt content.
    pub content: String,
}

/// Outcome of resolving a marker command against the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolLookup<'a> {
    /// The command matched a key directly.
    Exact(&'a ToolEntry),
    /// The command matched a key by substring.
    Fuzzy {
        key: &'a str,
        entry: &'a ToolEntry,
    },
    /// Nothing matched.
    NotFound,
}

impl<'a> ToolLookup<'a> {
    /// Returns the resolved entry, if any.
    pub fn entry(&self) -> Option<&'a ToolEntry> {
        match self {
            ToolLookup::Exact(entry) | ToolLookup::Fuzzy { entry, .. } => Some(entry),
            ToolLookup::NotFound => None,
        }
    }
}

/// Immutable map from marker key to tool entry.
///
/// Built once per request; the inline engine derives its marker matcher from
/// [`ToolSet::marker_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSet {
    entries: BTreeMap<String, ToolEntry>,
}

impl ToolSet {
    /// Builds a set from tool prompts. The first prompt wins on key collision.
    pub fn from_prompts(prompts: &[ToolPrompt]) -> Self {
        let mut entries = BTreeMap::new();
        for prompt in prompts {
            entries
                .entry(marker_key(&prompt.command))
                .or_insert_with(|| ToolEntry {
                    command: prompt.command.clone(),
                    title: prompt.title.clone(),
                    content: prompt.content.clone(),
                });
        }
        Self { entries }
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set holds no tools.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marker keys (lowercase, leading `/` stripped), in sorted order.
    pub fn marker_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolves a command as written by the model.
    ///
    /// Exact match first (case-insensitive, `_` and `-` equivalent), then the
    /// first key that contains the command or is contained by it.
    pub fn resolve(&self, command: &str) -> ToolLookup<'_> {
        let wanted = fuzzy_key(command);
        if wanted.is_empty() {
            return ToolLookup::NotFound;
        }

        if let Some(entry) = self.entries.get(&marker_key(command)) {
            return ToolLookup::Exact(entry);
        }
        if let Some(entry) = self
            .entries
            .iter()
            .find(|(key, _)| fuzzy_key(key) == wanted)
            .map(|(_, entry)| entry)
        {
            return ToolLookup::Exact(entry);
        }

        self.entries
            .iter()
            .find(|(key, _)| {
                let key = fuzzy_key(key);
                key.contains(&wanted) || wanted.contains(&key)
            })
            .map(|(key, entry)| ToolLookup::Fuzzy { key, entry })
            .unwrap_or(ToolLookup::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> ToolSet {
        ToolSet::from_prompts(&[
            ToolPrompt::new("/base-graph-spec", "Graph", "GRAPH CONTENT").unwrap(),
            ToolPrompt::new("flow_chart", "Flow", "FLOW CONTENT").unwrap(),
        ])
    }

    #[test]
    fn keys_are_normalized() {
        let set = tools();
        let keys: Vec<&str> = set.marker_keys().collect();
        assert_eq!(keys, vec!["base-graph-spec", "flow_chart"]);
    }

    #[test]
    fn resolve_matches_case_insensitively() {
        let set = tools();
        let lookup = set.resolve("BASE-GRAPH-SPEC");
        assert!(matches!(lookup, ToolLookup::Exact(e) if e.content == "GRAPH CONTENT"));
    }

    #[test]
    fn resolve_treats_underscore_and_hyphen_alike() {
        let set = tools();
        assert!(matches!(set.resolve("flow-chart"), ToolLookup::Exact(_)));
        assert!(matches!(set.resolve("base_graph_spec"), ToolLookup::Exact(_)));
    }

    #[test]
    fn resolve_falls_back_to_substring_match() {
        let set = tools();
        match set.resolve("graph") {
            ToolLookup::Fuzzy { key, entry } => {
                assert_eq!(key, "base-graph-spec");
                assert_eq!(entry.title, "Graph");
            }
            other => panic!("expected fuzzy match, got {:?}", other),
        }
    }

    #[test]
    fn resolve_reports_not_found() {
        let set = tools();
        assert_eq!(set.resolve("scene"), ToolLookup::NotFound);
        assert_eq!(set.resolve("/"), ToolLookup::NotFound);
    }

    #[test]
    fn first_prompt_wins_on_collision() {
        let set = ToolSet::from_prompts(&[
            ToolPrompt::new("/graph", "First", "1").unwrap(),
            ToolPrompt::new("Graph", "Second", "2").unwrap(),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.resolve("graph").entry().unwrap().title, "First");
    }
}
