//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the tool subsystem and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - The model-call capability (streaming and non-streaming)
//! - `ToolEventSink` - Best-effort UI progress notifications
//! - `ToolPromptSource` - The tools available to a request

mod ai_provider;
mod tool_event_sink;
mod tool_prompt_source;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
pub use tool_event_sink::{EventSinkError, ToolEventSink};
pub use tool_prompt_source::{ToolPromptSource, ToolSourceError};
