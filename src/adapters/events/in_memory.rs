//! In-memory tool event sink for testing.
//!
//! Captures every emitted event for assertions. Can be switched into a
//! failing mode to check that emission failures never interrupt a stream.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::tooling::{ToolEventKind, ToolExecutionEvent};
use crate::ports::{EventSinkError, ToolEventSink};

/// In-memory sink recording events in emission order.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned.
///
/// # Example
///
/// ```ignore
/// let sink = Arc::new(InMemoryToolEventSink::new());
/// // ... run the inline engine with the sink
/// assert_eq!(sink.kinds(), vec![ToolEventKind::Executing, ToolEventKind::Completed]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryToolEventSink {
    events: RwLock<Vec<ToolExecutionEvent>>,
    failing: AtomicBool,
}

impl InMemoryToolEventSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose every emission fails (events are still recorded).
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.failing.store(true, Ordering::SeqCst);
        sink
    }

    // === Test Helpers ===

    /// Returns all emitted events.
    pub fn events(&self) -> Vec<ToolExecutionEvent> {
        self.events
            .read()
            .expect("InMemoryToolEventSink: events lock poisoned")
            .clone()
    }

    /// Returns the kinds of all emitted events, in order.
    pub fn kinds(&self) -> Vec<ToolEventKind> {
        self.events().iter().map(ToolExecutionEvent::kind).collect()
    }

    /// Returns events referring to `tool`.
    pub fn events_for_tool(&self, tool: &str) -> Vec<ToolExecutionEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.tool() == tool)
            .collect()
    }

    /// Returns count of emitted events.
    pub fn event_count(&self) -> usize {
        self.events
            .read()
            .expect("InMemoryToolEventSink: events lock poisoned")
            .len()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events
            .write()
            .expect("InMemoryToolEventSink: events write lock poisoned")
            .clear();
    }
}

#[async_trait]
impl ToolEventSink for InMemoryToolEventSink {
    async fn emit(&self, event: ToolExecutionEvent) -> Result<(), EventSinkError> {
        self.events
            .write()
            .expect("InMemoryToolEventSink: events write lock poisoned")
            .push(event);

        if self.failing.load(Ordering::SeqCst) {
            return Err(EventSinkError::Delivery("sink configured to fail".to_string()));
        }
        Ok(())
    }
}
