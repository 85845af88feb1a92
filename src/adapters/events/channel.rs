//! Channel-backed tool event sink.
//!
//! Serializes each event to its JSON wire form and hands it to a tokio mpsc
//! channel. The receiving half typically lives in the websocket or SSE writer
//! of the chat connection.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::tooling::ToolExecutionEvent;
use crate::ports::{EventSinkError, ToolEventSink};

/// Sends JSON-encoded tool events over a bounded channel.
///
/// Events that do not fit are dropped with [`EventSinkError::Full`].
#[derive(Debug, Clone)]
pub struct ChannelToolEventSink {
    sender: mpsc::Sender<String>,
}

impl ChannelToolEventSink {
    /// Wraps the sending half of a channel.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }

    /// Creates a sink and the matching receiver.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl ToolEventSink for ChannelToolEventSink {
    async fn emit(&self, event: ToolExecutionEvent) -> Result<(), EventSinkError> {
        let frame = serde_json::to_string(&event)
            .map_err(|e| EventSinkError::Serialization(e.to_string()))?;

        // Never wait for the receiver: a stalled client must not pause the response.
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => EventSinkError::Full,
            TrySendError::Closed(_) => EventSinkError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_json_frames() {
        let (sink, mut receiver) = ChannelToolEventSink::channel(4);

        sink.emit(ToolExecutionEvent::completed("graph")).await.unwrap();

        let frame = receiver.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "tool_completed");
        assert_eq!(value["data"]["tool"], "graph");
    }

    #[tokio::test]
    async fn closed_receiver_is_reported() {
        let (sink, receiver) = ChannelToolEventSink::channel(1);
        drop(receiver);

        let result = sink.emit(ToolExecutionEvent::executing("graph")).await;
        assert_eq!(result, Err(EventSinkError::Closed));
    }

    #[tokio::test]
    async fn full_channel_drops_event_without_waiting() {
        let (sink, mut receiver) = ChannelToolEventSink::channel(1);

        sink.emit(ToolExecutionEvent::executing("graph")).await.unwrap();
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            sink.emit(ToolExecutionEvent::completed("graph")),
        )
        .await
        .expect("emit must not block on a full channel");
        assert_eq!(result, Err(EventSinkError::Full));

        let frame = receiver.recv().await.unwrap();
        assert!(frame.contains("tool_executing"));
        assert!(receiver.try_recv().is_err());
    }
}
