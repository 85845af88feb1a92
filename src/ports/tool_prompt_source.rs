//! ToolPromptSource port - supplies the tools available to a request.
//!
//! Access rules and group composition are applied behind this port; the tool
//! subsystem takes the returned list as given.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::tooling::ToolPrompt;

/// Port for resolving tool prompts.
#[async_trait]
pub trait ToolPromptSource: Send + Sync {
    /// Tools of `group`, or every tool when `group` is `None`.
    ///
    /// An unknown group yields an empty list, not an error.
    async fn tool_prompts(&self, group: Option<&str>) -> Result<Vec<ToolPrompt>, ToolSourceError>;
}

/// Tool source errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolSourceError {
    /// The backing store could not be read.
    #[error("tool source unavailable: {0}")]
    Unavailable(String),

    /// The backing data is malformed.
    #[error("invalid tool definition: {0}")]
    Invalid(String),

    /// Two tools normalize to the same marker command.
    #[error("duplicate tool command: {command}")]
    DuplicateCommand { command: String },
}

impl ToolSourceError {
    /// Domain error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ToolSourceError::DuplicateCommand { .. } => ErrorCode::DuplicateToolCommand,
            ToolSourceError::Invalid(_) => ErrorCode::InvalidFormat,
            ToolSourceError::Unavailable(_) => ErrorCode::ToolSourceUnavailable,
        }
    }
}

impl From<ToolSourceError> for DomainError {
    fn from(err: ToolSourceError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ToolPromptSource) {}

    #[test]
    fn duplicate_command_maps_to_domain_code() {
        let err: DomainError = ToolSourceError::DuplicateCommand {
            command: "graph".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::DuplicateToolCommand);
        assert!(err.message.contains("graph"));
    }

    #[test]
    fn unavailable_maps_to_domain_code() {
        let err: DomainError = ToolSourceError::Unavailable("disk".to_string()).into();
        assert_eq!(err.code, ErrorCode::ToolSourceUnavailable);
    }
}
