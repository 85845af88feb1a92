//! Tool mode selection - which strategy governs a request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Strategy for surfacing tools to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Two-stage gating: select tools first, then generate with their content.
    Gating,
    /// Every tool's full content is appended to the system prompt.
    Concat,
    /// Short hints up front; markers in the stream trigger nested calls.
    #[default]
    Inline,
    /// Tools are not surfaced at all.
    None,
}

impl ToolMode {
    /// Returns the configuration name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Gating => "gating",
            ToolMode::Concat => "concat",
            ToolMode::Inline => "inline",
            ToolMode::None => "none",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gating" => Ok(ToolMode::Gating),
            "concat" => Ok(ToolMode::Concat),
            "inline" => Ok(ToolMode::Inline),
            "none" => Ok(ToolMode::None),
            other => Err(ValidationError::invalid_format(
                "tool_mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

/// Rules that identify utility requests (title generation and the like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityPolicy {
    /// Task names that never get tools.
    pub utility_tasks: Vec<String>,
    /// Case-insensitive fragments of a base prompt that mark a utility request.
    pub title_keywords: Vec<String>,
}

impl Default for UtilityPolicy {
    fn default() -> Self {
        Self {
            utility_tasks: vec![
                "title_generation".to_string(),
                "summary".to_string(),
                "title".to_string(),
            ],
            title_keywords: vec![
                "title".to_string(),
                "제목".to_string(),
                "generate a title".to_string(),
                "Create a concise".to_string(),
            ],
        }
    }
}

impl UtilityPolicy {
    /// True if the request is a utility request that must skip tooling.
    pub fn is_utility_request(&self, task: Option<&str>, base_system: &str) -> bool {
        if let Some(task) = task {
            if self.utility_tasks.iter().any(|t| t == task) {
                return true;
            }
        }

        let lowered = base_system.to_lowercase();
        self.title_keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

/// Why a mode was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeReason {
    /// Utility requests never get tools.
    UtilityRequest,
    /// No tools were resolved for the request.
    NoToolsAvailable,
    /// The model's own setting.
    ModelConfigured,
    /// Fallback when the model has no setting.
    DefaultMode,
}

/// Effective mode for a request, with the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSelection {
    pub mode: ToolMode,
    pub reason: ModeReason,
}

/// Chooses exactly one strategy per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSelector {
    default_mode: ToolMode,
    policy: UtilityPolicy,
}

impl ModeSelector {
    /// Creates a selector with a default mode and utility policy.
    pub fn new(default_mode: ToolMode, policy: UtilityPolicy) -> Self {
        Self {
            default_mode,
            policy,
        }
    }

    /// Selects the effective mode.
    ///
    /// Utility requests and requests without tools always resolve to
    /// [`ToolMode::None`]; otherwise the model's setting wins over the default.
    pub fn select(
        &self,
        configured: Option<ToolMode>,
        task: Option<&str>,
        base_system: &str,
        tools_available: bool,
    ) -> ModeSelection {
        if self.policy.is_utility_request(task, base_system) {
            return ModeSelection {
                mode: ToolMode::None,
                reason: ModeReason::UtilityRequest,
            };
        }
        if !tools_available {
            return ModeSelection {
                mode: ToolMode::None,
                reason: ModeReason::NoToolsAvailable,
            };
        }

        match configured {
            Some(mode) => ModeSelection {
                mode,
                reason: ModeReason::ModelConfigured,
            },
            None => ModeSelection {
                mode: self.default_mode,
                reason: ModeReason::DefaultMode,
            },
        }
    }
}
