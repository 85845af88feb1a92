//! ToolAwareStream - the final response stream with tool handling applied.
//!
//! Upstream chunks are pulled one at a time and handed to a processor chosen
//! by the tool mode. The next chunk is not requested until the processor
//! returns, so nested tool calls pause the upstream stream. Dropping a
//! `ToolAwareStream` drops the pending nested call and the upstream stream
//! with it.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use super::generate::GenerationError;
use super::inline_executor::InlineToolExecutor;
use crate::domain::foundation::Timestamp;
use crate::domain::tooling::{FenceEvent, FenceTracker, ToolExecutionEvent};
use crate::ports::{CompletionStream, ToolEventSink};

type TextStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Per-mode handling of the final response text.
pub(crate) enum StreamProcessor {
    /// Text is forwarded untouched.
    Passthrough,
    /// Text is forwarded untouched; fenced tool blocks produce progress events.
    Tracked {
        tracker: FenceTracker,
        sink: Option<Arc<dyn ToolEventSink>>,
    },
    /// Inline markers are resolved with nested calls.
    Inline(Box<InlineToolExecutor>),
}

impl StreamProcessor {
    async fn process(&mut self, chunk: &str) -> String {
        match self {
            StreamProcessor::Passthrough => chunk.to_string(),
            StreamProcessor::Tracked { tracker, sink } => {
                for event in tracker.observe(chunk) {
                    let event = match event {
                        FenceEvent::Opened(command) => ToolExecutionEvent::executing(command),
                        FenceEvent::Closed(command) => ToolExecutionEvent::completed(command),
                    };
                    if let Some(sink) = sink {
                        let kind = event.type_name();
                        if let Err(e) = sink.emit(event).await {
                            tracing::warn!(event = kind, error = %e, "tool event dropped");
                        }
                    }
                }
                chunk.to_string()
            }
            StreamProcessor::Inline(executor) => executor.process_chunk(chunk).await,
        }
    }

    fn finish(&mut self) -> String {
        match self {
            StreamProcessor::Passthrough => String::new(),
            StreamProcessor::Tracked { tracker, .. } => {
                if let Some(command) = tracker.finish() {
                    tracing::warn!(command = %command, "response ended inside a tool block");
                }
                String::new()
            }
            StreamProcessor::Inline(executor) => executor.flush(),
        }
    }

    /// Runs a whole response through the processor: one chunk, then flush.
    pub(crate) async fn process_all(&mut self, text: &str) -> String {
        let mut out = self.process(text).await;
        out.push_str(&self.finish());
        out
    }
}

struct StreamState {
    upstream: CompletionStream,
    processor: StreamProcessor,
    started_at: Timestamp,
    pieces: usize,
    done: bool,
}

/// Stream of response text, tool output spliced in.
///
/// An upstream error is yielded once and ends the stream; held-back marker
/// text is discarded in that case.
pub struct ToolAwareStream {
    inner: TextStream,
}

impl ToolAwareStream {
    pub(crate) fn new(upstream: CompletionStream, processor: StreamProcessor) -> Self {
        let state = StreamState {
            upstream,
            processor,
            started_at: Timestamp::now(),
            pieces: 0,
            done: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            loop {
                match state.upstream.next().await {
                    Some(Ok(chunk)) => {
                        if chunk.delta.is_empty() {
                            continue;
                        }
                        let text = state.processor.process(&chunk.delta).await;
                        if !text.is_empty() {
                            state.pieces += 1;
                            return Some((Ok(text), state));
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "upstream stream failed");
                        state.done = true;
                        return Some((Err(GenerationError::Provider(e)), state));
                    }
                    None => {
                        state.done = true;
                        let rest = state.processor.finish();
                        tracing::debug!(
                            pieces = state.pieces,
                            elapsed_ms = state.started_at.elapsed_ms(),
                            "response stream finished"
                        );
                        if rest.is_empty() {
                            return None;
                        }
                        return Some((Ok(rest), state));
                    }
                }
            }
        });

        Self {
            inner: Box::pin(inner),
        }
    }

    /// Drains the stream into one string, stopping at the first error.
    pub async fn collect_text(mut self) -> Result<String, GenerationError> {
        let mut text = String::new();
        while let Some(piece) = self.next().await {
            text.push_str(&piece?);
        }
        Ok(text)
    }
}

impl Stream for ToolAwareStream {
    type Item = Result<String, GenerationError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
