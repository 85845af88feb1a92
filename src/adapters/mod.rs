//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - Scripted AI provider
//! - `events` - Tool event sinks (in-memory, channel)
//! - `prompts` - Tool prompt sources (in-memory, YAML file)

pub mod ai;
pub mod events;
pub mod prompts;

pub use ai::{MockAIProvider, MockError, MockResponse, RecordedCall};
pub use events::{ChannelToolEventSink, InMemoryToolEventSink};
pub use prompts::{InMemoryToolPromptSource, YamlToolCatalog};
