//! Application layer - Commands and Handlers.
//!
//! This layer runs the async protocols (gating, inline execution, final
//! generation) on top of the domain and the ports.

pub mod handlers;

pub use handlers::{
    GatingOutcome, GatingStage, GenerateWithToolsHandler, GenerationCommand, GenerationError,
    GenerationOutput, GenerationSettings, InlineExecutorConfig, InlineToolExecutor,
    PreparedGeneration, ToolAwareStream, ToolGate,
};
