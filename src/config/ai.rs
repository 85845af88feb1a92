//! Model call configuration

use serde::Deserialize;
use std::time::Duration;

/// Limits applied to the model calls the tool subsystem makes itself
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    /// Timeout for nested tool and recovery calls in seconds (0 disables)
    #[serde(default = "default_nested_timeout")]
    pub nested_call_timeout_secs: u64,

    /// Timeout for the Stage 1 selection call in seconds (0 disables)
    #[serde(default = "default_stage1_timeout")]
    pub stage1_timeout_secs: u64,
}

impl AiConfig {
    /// Nested call timeout, `None` when disabled
    pub fn nested_call_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.nested_call_timeout_secs)
    }

    /// Stage 1 timeout, `None` when disabled
    pub fn stage1_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.stage1_timeout_secs)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            nested_call_timeout_secs: default_nested_timeout(),
            stage1_timeout_secs: default_stage1_timeout(),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_nested_timeout() -> u64 {
    60
}

fn default_stage1_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.nested_call_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.stage1_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_disables_timeout() {
        let config = AiConfig {
            nested_call_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.nested_call_timeout(), None);
    }
}
