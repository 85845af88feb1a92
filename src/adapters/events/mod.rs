//! Tool event sink adapters.
//!
//! - `InMemoryToolEventSink` - Captures events for tests
//! - `ChannelToolEventSink` - Bridges events to a connection writer

mod channel;
mod in_memory;

pub use channel::ChannelToolEventSink;
pub use in_memory::InMemoryToolEventSink;
