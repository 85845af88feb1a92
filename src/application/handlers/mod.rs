//! Application handlers.
//!
//! Handlers orchestrate the pure tooling domain against the ports.

pub mod tooling;

pub use tooling::{
    complete_within, GatingOutcome, GatingStage, GenerateWithToolsHandler, GenerationCommand,
    GenerationError, GenerationOutput, GenerationSettings, InlineExecutorConfig,
    InlineToolExecutor, PreparedGeneration, ToolAwareStream, ToolGate,
};
