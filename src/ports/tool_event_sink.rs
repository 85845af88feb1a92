//! ToolEventSink port - where tool progress notifications go.
//!
//! Delivery is best-effort. Callers log a failed emission and carry on; a
//! sink error must never interrupt the response stream.

use async_trait::async_trait;

use crate::domain::tooling::ToolExecutionEvent;

/// Port for UI progress notifications.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = sink.emit(ToolExecutionEvent::executing("graph")).await {
///     tracing::warn!(error = %e, "tool event dropped");
/// }
/// ```
#[async_trait]
pub trait ToolEventSink: Send + Sync {
    /// Emit one event. Never retried.
    async fn emit(&self, event: ToolExecutionEvent) -> Result<(), EventSinkError>;
}

/// Event delivery errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventSinkError {
    /// The receiving side is gone (client disconnected).
    #[error("event channel closed")]
    Closed,

    /// The receiver is not keeping up; the event was dropped.
    #[error("event channel full, event dropped")]
    Full,

    /// The event could not be encoded for the transport.
    #[error("event serialization failed: {0}")]
    Serialization(String),

    /// Any other transport failure.
    #[error("event delivery failed: {0}")]
    Delivery(String),
}
