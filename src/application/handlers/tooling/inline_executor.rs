//! InlineToolExecutor - resolves tool markers in a streamed response.
//!
//! Wraps a [`MarkerScanner`] and turns each detected marker into text:
//! a tool marker becomes the output of a nested model call made with the
//! tool's full prompt, an unsupported marker becomes a short prose
//! continuation. Failures never escape; each one has an inert textual
//! replacement so the outer stream keeps going.
//!
//! Calls are strictly sequential. While a nested call runs, the caller is
//! suspended and no further chunks are pulled from upstream.

use std::sync::Arc;
use std::time::Duration;

use super::nested_call::complete_within;
use crate::domain::tooling::{
    MarkerScanner, ScanState, Segment, ToolExecutionEvent, ToolLookup, ToolSet,
};
use crate::ports::{AIProvider, CompletionRequest, ToolEventSink};

const RECOVERY_SYSTEM_PROMPT: &str = "You are continuing an answer whose planned visualization could not be produced.
Carry on with the explanation in plain prose instead.

Rules:
- Do not say that a visualization or tool failed.
- Continue as if prose had been the plan all along.
- Write math in LaTeX ($...$).
- Keep it short and clear.";

/// Executor limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineExecutorConfig {
    /// Characters of already emitted text handed to a recovery call.
    pub recovery_context_chars: usize,
    /// Deadline for each nested call; `None` waits indefinitely.
    pub nested_call_timeout: Option<Duration>,
}

impl Default for InlineExecutorConfig {
    fn default() -> Self {
        Self {
            recovery_context_chars: 1000,
            nested_call_timeout: None,
        }
    }
}

/// Per-response inline marker engine.
pub struct InlineToolExecutor {
    tools: ToolSet,
    scanner: MarkerScanner,
    provider: Option<Arc<dyn AIProvider>>,
    sink: Option<Arc<dyn ToolEventSink>>,
    template: CompletionRequest,
    config: InlineExecutorConfig,
    generated: String,
}

impl InlineToolExecutor {
    /// Creates an executor for `tools`.
    ///
    /// `template` supplies provider options and metadata for nested calls.
    /// Without a provider, tool markers resolve to placeholders and recovery
    /// returns a fixed sentence.
    pub fn new(tools: ToolSet, template: CompletionRequest) -> Self {
        let scanner = MarkerScanner::for_tool_set(&tools);
        Self {
            tools,
            scanner,
            provider: None,
            sink: None,
            template,
            config: InlineExecutorConfig::default(),
            generated: String::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn AIProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn ToolEventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_config(mut self, config: InlineExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Scanner state after the last chunk.
    pub fn state(&self) -> ScanState {
        self.scanner.state()
    }

    /// Everything emitted so far, tool output included.
    pub fn generated_so_far(&self) -> &str {
        &self.generated
    }

    /// Processes one upstream chunk and returns the text to emit now.
    pub async fn process_chunk(&mut self, chunk: &str) -> String {
        let mut output = String::new();

        for segment in self.scanner.feed(chunk) {
            let piece = match segment {
                Segment::Text(text) => text,
                Segment::Invocation { command, context } => {
                    tracing::debug!(command = %command, context_len = context.len(), "tool marker detected");
                    self.execute_tool(&command, &context).await
                }
                Segment::Unsupported { tool, reason } => {
                    tracing::info!(tool = %tool, reason = %reason, "unsupported tool marker detected");
                    self.recover(&tool, &reason).await
                }
            };
            self.generated.push_str(&piece);
            output.push_str(&piece);
        }

        output
    }

    /// Ends the stream, releasing held-back text verbatim.
    pub fn flush(&mut self) -> String {
        let rest = self.scanner.finish();
        if !rest.is_empty() {
            tracing::debug!(len = rest.len(), "flushing unterminated marker text");
        }
        self.generated.push_str(&rest);
        rest
    }

    async fn execute_tool(&self, command: &str, context: &str) -> String {
        self.emit(ToolExecutionEvent::executing(command)).await;

        let entry = match self.tools.resolve(command) {
            ToolLookup::Exact(entry) => entry,
            ToolLookup::Fuzzy { key, entry } => {
                tracing::debug!(command = %command, matched = %key, "tool resolved by fuzzy match");
                entry
            }
            ToolLookup::NotFound => {
                tracing::warn!(command = %command, "tool prompt not found");
                self.emit(ToolExecutionEvent::completed(command)).await;
                return format!("\n<!-- Tool '{}' not found -->\n", command);
            }
        };

        let Some(provider) = &self.provider else {
            tracing::warn!(command = %command, "no provider for nested tool call");
            self.emit(ToolExecutionEvent::completed(command)).await;
            return format!("\n<!-- No LLM function for tool '{}' -->\n", command);
        };

        let system_prompt = tool_system_prompt(&entry.content, context);
        let request = self.template.for_nested_call(system_prompt, context);

        match complete_within(provider.as_ref(), request, self.config.nested_call_timeout).await {
            Ok(output) => {
                tracing::info!(command = %command, output_len = output.len(), "tool output received");
                self.emit(ToolExecutionEvent::completed(command)).await;
                format!("\n{}\n", output)
            }
            Err(e) => {
                tracing::error!(command = %command, error = %e, "tool call failed");
                self.emit(ToolExecutionEvent::failed(command)).await;
                format!("\n<!-- Tool error: {} -->\n", escape_comment(&e.to_string()))
            }
        }
    }

    async fn recover(&self, tool: &str, reason: &str) -> String {
        self.emit(ToolExecutionEvent::recovery(tool)).await;

        let Some(provider) = &self.provider else {
            tracing::warn!(tool = %tool, "no provider for recovery call");
            return format!("\n\n(Unable to generate the visualization: {})\n\n", reason);
        };

        let user_message = format!(
            "Response so far:\n{}\n\nTool failure reason: {}\n\nContinue naturally from the above in 1-2 sentences.",
            tail_chars(&self.generated, self.config.recovery_context_chars),
            reason
        );
        let request = self.template.for_nested_call(RECOVERY_SYSTEM_PROMPT, user_message);

        match complete_within(provider.as_ref(), request, self.config.nested_call_timeout).await {
            Ok(text) => {
                self.emit(ToolExecutionEvent::recovery_completed(tool)).await;
                format!(" {}", text)
            }
            Err(e) => {
                tracing::error!(tool = %tool, error = %e, "recovery call failed, dropping recovery");
                String::new()
            }
        }
    }

    async fn emit(&self, event: ToolExecutionEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        let kind = event.type_name();
        if let Err(e) = sink.emit(event).await {
            tracing::warn!(event = kind, error = %e, "tool event dropped");
        }
    }
}

fn tool_system_prompt(content: &str, context: &str) -> String {
    format!(
        "{}\n\nGenerate the visualization for the following request:\n{}\n\n\
         Output ONLY the tool-specific block wrapped in its markers.\n\
         Do NOT add any explanation before or after the block.",
        content, context
    )
}

/// Last `n` characters of `text`.
fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}

/// Keeps error text from terminating the HTML comment early.
fn escape_comment(text: &str) -> String {
    text.replace("--", "- -")
}
