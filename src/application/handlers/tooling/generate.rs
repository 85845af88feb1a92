//! GenerateWithToolsHandler - prepares and runs a tool-aware generation.
//!
//! `prepare` decides the tool mode and composes the final system prompt
//! (running the gating protocol when selected). `stream` and `complete` then
//! issue the final model call and route its text through the processor the
//! mode calls for.

use std::sync::Arc;
use std::time::Duration;

use super::gate::{GatingOutcome, ToolGate};
use super::inline_executor::{InlineExecutorConfig, InlineToolExecutor};
use super::tool_stream::{StreamProcessor, ToolAwareStream};
use crate::config::AppConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::tooling::{
    build_tool_hints, compose_with_tools, FenceTracker, HintOptions, ModeSelection, ModeSelector,
    ToolMode, ToolPrompt, ToolSet,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, TokenUsage, ToolEventSink, ToolPromptSource,
    ToolSourceError,
};

/// Command to generate a response with tools.
#[derive(Debug, Clone)]
pub struct GenerationCommand {
    /// The request as it would be sent without tools; its system prompt is
    /// the base prompt.
    pub request: CompletionRequest,
    /// Tool mode configured for the model, if any.
    pub tool_mode: Option<ToolMode>,
    /// Internal task name (title generation, tagging, ...).
    pub task: Option<String>,
    /// Tool group to resolve; `None` for every tool.
    pub tool_group: Option<String>,
}

impl GenerationCommand {
    pub fn new(request: CompletionRequest) -> Self {
        Self {
            request,
            tool_mode: None,
            task: None,
            tool_group: None,
        }
    }

    pub fn with_tool_mode(mut self, mode: ToolMode) -> Self {
        self.tool_mode = Some(mode);
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_tool_group(mut self, group: impl Into<String>) -> Self {
        self.tool_group = Some(group.into());
        self
    }
}

/// A request ready for the final generation call.
#[derive(Debug, Clone)]
pub struct PreparedGeneration {
    /// Final request, system prompt composed.
    pub request: CompletionRequest,
    pub selection: ModeSelection,
    /// Present in gating mode.
    pub gating: Option<GatingOutcome>,
    /// Tools whose markers or blocks are handled in the response.
    pub tools: ToolSet,
}

impl PreparedGeneration {
    /// Effective mode.
    pub fn mode(&self) -> ToolMode {
        self.selection.mode
    }
}

/// Non-streaming generation result.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Response text with tool output spliced in.
    pub content: String,
    /// Usage of the final call only.
    pub usage: TokenUsage,
    pub model: String,
}

/// Errors that end a generation.
///
/// Tool failures inside the response never surface here.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    ToolSource(#[from] ToolSourceError),

    #[error(transparent)]
    Provider(#[from] AIError),
}

impl From<GenerationError> for DomainError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::ToolSource(e) => e.into(),
            GenerationError::Provider(e) => e.into(),
        }
    }
}

impl GenerationError {
    /// Domain error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::ToolSource(e) => e.code(),
            GenerationError::Provider(_) => ErrorCode::AIProviderError,
        }
    }
}

/// Handler settings.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub selector: ModeSelector,
    pub hints: HintOptions,
    pub inline: InlineExecutorConfig,
    pub stage1_timeout: Option<Duration>,
    /// Emit progress events for fenced tool blocks in gating/concat streams.
    pub track_fenced_blocks: bool,
}

impl GenerationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            selector: config.tooling.mode_selector(),
            hints: config.tooling.hint_options(),
            inline: InlineExecutorConfig {
                recovery_context_chars: config.tooling.recovery_context_chars,
                nested_call_timeout: config.ai.nested_call_timeout(),
            },
            stage1_timeout: config.ai.stage1_timeout(),
            track_fenced_blocks: config.tooling.track_fenced_blocks,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Handler for tool-aware generation.
pub struct GenerateWithToolsHandler {
    provider: Arc<dyn AIProvider>,
    tool_source: Arc<dyn ToolPromptSource>,
    settings: GenerationSettings,
}

impl GenerateWithToolsHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        tool_source: Arc<dyn ToolPromptSource>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            tool_source,
            settings,
        }
    }

    /// Resolves tools, selects the mode and composes the final request.
    pub async fn prepare(
        &self,
        cmd: GenerationCommand,
    ) -> Result<PreparedGeneration, GenerationError> {
        let base = cmd.request.system_prompt.clone().unwrap_or_default();
        let trace_id = cmd.request.metadata.trace_id.clone();
        let task = cmd.task.as_deref();

        // 1. Requests that can never get tools skip the tool lookup
        let early = self
            .settings
            .selector
            .select(cmd.tool_mode, task, &base, true);
        if early.mode == ToolMode::None {
            tracing::debug!(trace_id = %trace_id, reason = ?early.reason, "tools disabled for request");
            return Ok(PreparedGeneration {
                request: cmd.request,
                selection: early,
                gating: None,
                tools: ToolSet::default(),
            });
        }

        // 2. Resolve tools and select the effective mode
        let tools = self
            .tool_source
            .tool_prompts(cmd.tool_group.as_deref())
            .await?;
        let selection = self
            .settings
            .selector
            .select(cmd.tool_mode, task, &base, !tools.is_empty());

        tracing::info!(
            trace_id = %trace_id,
            mode = %selection.mode,
            reason = ?selection.reason,
            tool_count = tools.len(),
            "tool mode selected"
        );

        // 3. Compose the final system prompt
        let mut gating = None;
        let (system_prompt, active) = match selection.mode {
            ToolMode::None => (base, ToolSet::default()),
            ToolMode::Gating => {
                let gate = ToolGate::new(self.provider.clone(), self.settings.stage1_timeout);
                let outcome = gate.run(&cmd.request, &base, &tools).await;
                let selected: Vec<ToolPrompt> = tools
                    .iter()
                    .filter(|t| outcome.selected_commands.contains(&t.command))
                    .cloned()
                    .collect();
                let prompt = outcome.system_prompt.clone();
                gating = Some(outcome);
                (prompt, ToolSet::from_prompts(&selected))
            }
            ToolMode::Concat => {
                let all: Vec<&ToolPrompt> = tools.iter().collect();
                (compose_with_tools(&base, &all), ToolSet::from_prompts(&tools))
            }
            ToolMode::Inline => {
                let hints = build_tool_hints(&tools, &self.settings.hints);
                let prompt = if base.trim().is_empty() {
                    hints
                } else {
                    format!("{}\n\n{}", base, hints)
                };
                (prompt, ToolSet::from_prompts(&tools))
            }
        };

        let mut request = cmd.request;
        if !system_prompt.is_empty() {
            request.system_prompt = Some(system_prompt);
        }

        Ok(PreparedGeneration {
            request,
            selection,
            gating,
            tools: active,
        })
    }

    /// Issues the final streaming call.
    pub async fn stream(
        &self,
        prepared: &PreparedGeneration,
        sink: Option<Arc<dyn ToolEventSink>>,
    ) -> Result<ToolAwareStream, GenerationError> {
        self.log_final_call(prepared, true);
        let upstream = self
            .provider
            .stream_complete(prepared.request.clone())
            .await?;
        Ok(ToolAwareStream::new(upstream, self.processor_for(prepared, sink)))
    }

    /// Issues the final non-streaming call and processes the whole text.
    pub async fn complete(
        &self,
        prepared: &PreparedGeneration,
        sink: Option<Arc<dyn ToolEventSink>>,
    ) -> Result<GenerationOutput, GenerationError> {
        self.log_final_call(prepared, false);
        let response = self.provider.complete(prepared.request.clone()).await?;
        let content = self
            .processor_for(prepared, sink)
            .process_all(&response.content)
            .await;
        Ok(GenerationOutput {
            content,
            usage: response.usage,
            model: response.model,
        })
    }

    fn log_final_call(&self, prepared: &PreparedGeneration, streaming: bool) {
        let info = self.provider.provider_info();
        tracing::debug!(
            trace_id = %prepared.request.metadata.trace_id,
            provider = %info.name,
            model = prepared.request.model.as_deref().unwrap_or(&info.model),
            mode = %prepared.mode(),
            streaming,
            "issuing final generation"
        );
    }

    fn processor_for(
        &self,
        prepared: &PreparedGeneration,
        sink: Option<Arc<dyn ToolEventSink>>,
    ) -> StreamProcessor {
        if prepared.tools.is_empty() {
            return StreamProcessor::Passthrough;
        }

        match prepared.mode() {
            ToolMode::Inline => {
                let mut executor =
                    InlineToolExecutor::new(prepared.tools.clone(), prepared.request.clone())
                        .with_provider(self.provider.clone())
                        .with_config(self.settings.inline.clone());
                if let Some(sink) = sink {
                    executor = executor.with_event_sink(sink);
                }
                StreamProcessor::Inline(Box::new(executor))
            }
            ToolMode::Gating | ToolMode::Concat if self.settings.track_fenced_blocks => {
                StreamProcessor::Tracked {
                    tracker: FenceTracker::new(prepared.tools.marker_keys()),
                    sink,
                }
            }
            _ => StreamProcessor::Passthrough,
        }
    }
}
