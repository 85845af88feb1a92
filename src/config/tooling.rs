//! Tool orchestration configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::tooling::{HintOptions, ModeSelector, ToolMode, UtilityPolicy};

/// Tool orchestration configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolingConfig {
    /// Mode used when a model has no explicit tool mode
    #[serde(default)]
    pub default_mode: ToolMode,

    /// Characters of already generated text handed to recovery calls
    #[serde(default = "default_recovery_chars")]
    pub recovery_context_chars: usize,

    /// Maximum characters of a tool description in inline hints
    #[serde(default = "default_hint_chars")]
    pub hint_description_max_chars: usize,

    /// Maximum example markers in inline hints
    #[serde(default = "default_hint_examples")]
    pub hint_examples: usize,

    /// Task names that never get tools
    #[serde(default = "default_utility_tasks")]
    pub utility_tasks: Vec<String>,

    /// Base prompt fragments that mark a utility request
    #[serde(default = "default_title_keywords")]
    pub title_keywords: Vec<String>,

    /// Emit progress events for fenced tool blocks in gating/concat streams
    #[serde(default = "default_track_fenced_blocks")]
    pub track_fenced_blocks: bool,
}

impl ToolingConfig {
    /// Utility request rules
    pub fn utility_policy(&self) -> UtilityPolicy {
        UtilityPolicy {
            utility_tasks: self.utility_tasks.clone(),
            title_keywords: self.title_keywords.clone(),
        }
    }

    /// Mode selector built from this configuration
    pub fn mode_selector(&self) -> ModeSelector {
        ModeSelector::new(self.default_mode, self.utility_policy())
    }

    /// Inline hint limits
    pub fn hint_options(&self) -> HintOptions {
        HintOptions {
            max_description_chars: self.hint_description_max_chars,
            max_examples: self.hint_examples,
        }
    }

    /// Validate tooling configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recovery_context_chars == 0 {
            return Err(ValidationError::ZeroRecoveryWindow);
        }
        if self.hint_description_max_chars == 0 {
            return Err(ValidationError::ZeroHintDescriptionLimit);
        }
        Ok(())
    }
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            default_mode: ToolMode::default(),
            recovery_context_chars: default_recovery_chars(),
            hint_description_max_chars: default_hint_chars(),
            hint_examples: default_hint_examples(),
            utility_tasks: default_utility_tasks(),
            title_keywords: default_title_keywords(),
            track_fenced_blocks: default_track_fenced_blocks(),
        }
    }
}

fn default_recovery_chars() -> usize {
    1000
}

fn default_hint_chars() -> usize {
    HintOptions::default().max_description_chars
}

fn default_hint_examples() -> usize {
    HintOptions::default().max_examples
}

fn default_utility_tasks() -> Vec<String> {
    UtilityPolicy::default().utility_tasks
}

fn default_title_keywords() -> Vec<String> {
    UtilityPolicy::default().title_keywords
}

fn default_track_fenced_blocks() -> bool {
    true
}
