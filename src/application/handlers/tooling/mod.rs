//! Tool orchestration handlers.
//!
//! - `GenerateWithToolsHandler` - Mode selection, prompt composition, final call
//! - `ToolGate` - Two-stage gating protocol
//! - `InlineToolExecutor` - Inline marker resolution over a stream
//! - `ToolAwareStream` - Final response stream with tool handling applied

mod gate;
mod generate;
mod inline_executor;
mod nested_call;
mod tool_stream;

pub use gate::{GatingOutcome, GatingStage, ToolGate};
pub use generate::{
    GenerateWithToolsHandler, GenerationCommand, GenerationError, GenerationOutput,
    GenerationSettings, PreparedGeneration,
};
pub use inline_executor::{InlineExecutorConfig, InlineToolExecutor};
pub use nested_call::complete_within;
pub use tool_stream::ToolAwareStream;
