//! ToolGate - the two-stage gating protocol.
//!
//! Stage 1 shows the model a short catalog and asks which tools it needs.
//! Stage 2 composes the final system prompt with the full content of the
//! selected tools only. Every failure degrades to the base prompt.

use std::sync::Arc;
use std::time::Duration;

use super::nested_call::complete_within;
use crate::domain::tooling::{
    build_selection_system_prompt, build_tool_catalog, compose_with_tools,
    parse_selection_response, select_by_commands, ToolPrompt,
};
use crate::ports::{AIProvider, CompletionRequest};

/// How far the protocol got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatingStage {
    /// The selection call failed; the base prompt is used.
    Stage1Failed,
    /// The model selected nothing usable; the base prompt is used.
    NoToolsSelected,
    /// At least one selected tool was found and composed in.
    ToolsSelected,
}

/// Result of running the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatingOutcome {
    pub stage: GatingStage,
    /// System prompt for the final generation call.
    pub system_prompt: String,
    /// Commands of the tools actually composed in, highest priority first.
    pub selected_commands: Vec<String>,
    /// Raw Stage 1 output, when the call succeeded.
    pub stage1_response: Option<String>,
}

impl GatingOutcome {
    fn fallback(stage: GatingStage, base_system: &str, stage1_response: Option<String>) -> Self {
        Self {
            stage,
            system_prompt: base_system.to_string(),
            selected_commands: Vec::new(),
            stage1_response,
        }
    }
}

/// Runs the two-stage gating protocol against a provider.
pub struct ToolGate {
    provider: Arc<dyn AIProvider>,
    stage1_timeout: Option<Duration>,
}

impl ToolGate {
    pub fn new(provider: Arc<dyn AIProvider>, stage1_timeout: Option<Duration>) -> Self {
        Self {
            provider,
            stage1_timeout,
        }
    }

    /// Selects tools for `request` and composes the final system prompt.
    ///
    /// The Stage 1 query is the request's last user message. A direct answer
    /// in the Stage 1 output is kept only in `stage1_response`; it never
    /// replaces the final generation.
    pub async fn run(
        &self,
        request: &CompletionRequest,
        base_system: &str,
        tools: &[ToolPrompt],
    ) -> GatingOutcome {
        // 1. Stage 1: catalog plus selection instructions, single non-streaming call
        let catalog = build_tool_catalog(tools);
        let selection_prompt = build_selection_system_prompt(base_system, &catalog);
        let query = request.last_user_message().unwrap_or_default();
        let stage1 = request.for_nested_call(selection_prompt, query);

        let raw = match complete_within(self.provider.as_ref(), stage1, self.stage1_timeout).await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    trace_id = %request.metadata.trace_id,
                    "tool selection call failed, continuing without tools"
                );
                return GatingOutcome::fallback(GatingStage::Stage1Failed, base_system, None);
            }
        };

        // 2. Decision
        let decision = parse_selection_response(&raw);
        if !decision.needs_tools() {
            tracing::debug!(
                trace_id = %request.metadata.trace_id,
                direct_answer = decision.direct_answer.is_some(),
                "no tools selected"
            );
            return GatingOutcome::fallback(GatingStage::NoToolsSelected, base_system, Some(raw));
        }

        // 3. Stage 2: compose the selected tools' full content
        let selected = select_by_commands(tools, &decision.selected_commands);
        if selected.is_empty() {
            tracing::debug!(
                trace_id = %request.metadata.trace_id,
                requested = ?decision.selected_commands,
                "selected commands matched no available tool"
            );
            return GatingOutcome::fallback(GatingStage::NoToolsSelected, base_system, Some(raw));
        }

        let mut ordered = selected.clone();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        let selected_commands: Vec<String> = ordered.iter().map(|t| t.command.clone()).collect();

        tracing::info!(
            trace_id = %request.metadata.trace_id,
            tools = ?selected_commands,
            "tools selected for final generation"
        );

        GatingOutcome {
            stage: GatingStage::ToolsSelected,
            system_prompt: compose_with_tools(base_system, &selected),
            selected_commands,
            stage1_response: Some(raw),
        }
    }
}
