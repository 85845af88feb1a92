//! Tool execution progress events.
//!
//! Fire-and-observe notifications for the UI. On the wire an event looks like
//! `{"type": "tool_executing", "data": {"tool": "...", "message": "..."}}`.

use serde::{Deserialize, Serialize};

/// Payload shared by all tool events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEventData {
    /// Tool command as written in the marker.
    pub tool: String,
    /// Human-readable status line.
    pub message: String,
}

/// Discriminator of a [`ToolExecutionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolEventKind {
    Executing,
    Completed,
    Recovery,
    RecoveryCompleted,
}

/// Progress notification emitted while tools run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ToolExecutionEvent {
    ToolExecuting(ToolEventData),
    ToolCompleted(ToolEventData),
    ToolRecovery(ToolEventData),
    ToolRecoveryCompleted(ToolEventData),
}

impl ToolExecutionEvent {
    /// A tool started executing.
    pub fn executing(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("Executing tool: {}", tool);
        Self::ToolExecuting(ToolEventData { tool, message })
    }

    /// A tool finished successfully.
    pub fn completed(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("Tool completed: {}", tool);
        Self::ToolCompleted(ToolEventData { tool, message })
    }

    /// A tool finished without output. Still a `tool_completed` event.
    pub fn failed(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("Tool failed: {}", tool);
        Self::ToolCompleted(ToolEventData { tool, message })
    }

    /// Recovery from an unsupported tool started.
    pub fn recovery(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("Recovering from unsupported tool: {}", tool);
        Self::ToolRecovery(ToolEventData { tool, message })
    }

    /// Recovery produced a prose continuation.
    pub fn recovery_completed(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("Recovery completed: {}", tool);
        Self::ToolRecoveryCompleted(ToolEventData { tool, message })
    }

    /// Returns the event kind.
    pub fn kind(&self) -> ToolEventKind {
        match self {
            Self::ToolExecuting(_) => ToolEventKind::Executing,
            Self::ToolCompleted(_) => ToolEventKind::Completed,
            Self::ToolRecovery(_) => ToolEventKind::Recovery,
            Self::ToolRecoveryCompleted(_) => ToolEventKind::RecoveryCompleted,
        }
    }

    /// Returns the event payload.
    pub fn data(&self) -> &ToolEventData {
        match self {
            Self::ToolExecuting(data)
            | Self::ToolCompleted(data)
            | Self::ToolRecovery(data)
            | Self::ToolRecoveryCompleted(data) => data,
        }
    }

    /// Returns the tool the event refers to.
    pub fn tool(&self) -> &str {
        &self.data().tool
    }

    /// Wire name of the event type.
    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            ToolEventKind::Executing => "tool_executing",
            ToolEventKind::Completed => "tool_completed",
            ToolEventKind::Recovery => "tool_recovery",
            ToolEventKind::RecoveryCompleted => "tool_recovery_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_type_and_data() {
        let event = ToolExecutionEvent::executing("graph");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "tool_executing",
                "data": {"tool": "graph", "message": "Executing tool: graph"}
            })
        );
    }

    #[test]
    fn failed_is_a_completed_event() {
        let event = ToolExecutionEvent::failed("graph");
        assert_eq!(event.kind(), ToolEventKind::Completed);
        assert_eq!(event.type_name(), "tool_completed");
        assert_eq!(event.data().message, "Tool failed: graph");
    }

    #[test]
    fn recovery_events_use_snake_case_names() {
        let value = serde_json::to_value(ToolExecutionEvent::recovery_completed("x")).unwrap();
        assert_eq!(value["type"], "tool_recovery_completed");
        assert_eq!(ToolExecutionEvent::recovery("x").type_name(), "tool_recovery");
    }

    #[test]
    fn deserializes_from_wire_format() {
        let event: ToolExecutionEvent = serde_json::from_str(
            r#"{"type": "tool_recovery", "data": {"tool": "graph", "message": "m"}}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), ToolEventKind::Recovery);
        assert_eq!(event.tool(), "graph");
    }
}
