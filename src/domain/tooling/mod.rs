//! Tooling domain - prompt-based tools for models without native tool calling.
//!
//! A *tool* is a named prompt fragment (diagram spec, graph spec, ...) that is
//! injected into the model's context only when it is relevant. This module
//! holds the pure parts of the orchestration: everything here is synchronous
//! and free of I/O, so the async protocol code in `application` stays thin.
//!
//! ## Key Types
//!
//! - [`ToolPrompt`] - A named, orderable prompt fragment
//! - [`ToolSet`] - Immutable map from normalized command to tool entry
//! - [`SelectionDecision`] - Parsed result of a Stage 1 selection call
//! - [`ToolMode`] / [`ModeSelector`] - Which strategy governs a request
//! - [`MarkerScanner`] - Incremental detector for inline tool markers
//! - [`FenceTracker`] - Observer for fenced tool blocks in a stream
//! - [`ToolExecutionEvent`] - UI progress notification

mod catalog;
mod composition;
mod events;
mod fence_tracker;
mod hints;
mod marker;
mod mode;
mod selection;
mod tool_prompt;
mod tool_set;

pub use catalog::build_tool_catalog;
pub use composition::{
    build_selection_system_prompt, compose_with_tools, select_by_commands,
    SELECTION_INSTRUCTIONS,
};
pub use events::{ToolEventData, ToolEventKind, ToolExecutionEvent};
pub use fence_tracker::{FenceEvent, FenceTracker};
pub use hints::{build_tool_hints, HintOptions};
pub use marker::{MarkerScanner, ScanState, Segment, UNSUPPORTED_TAG};
pub use mode::{ModeReason, ModeSelection, ModeSelector, ToolMode, UtilityPolicy};
pub use selection::{parse_selection_response, SelectionDecision};
pub use tool_prompt::{fuzzy_key, marker_key, strip_marker_prefix, ToolPrompt};
pub use tool_set::{ToolEntry, ToolLookup, ToolSet};
