//! Mock AI Provider for testing.
//!
//! Scripted implementation of the AIProvider port. Responses are consumed in
//! call order, which matches how the tool subsystem issues calls: Stage 1,
//! then the final generation, then nested tool calls one at a time.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_stream_chunks(["Look: <gra", "ph>y=x</graph>"])
//!     .with_response("{\"type\": \"graph\"}");
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

const DEFAULT_CHUNK_CHARS: usize = 8;

/// Mock AI provider for testing.
///
/// # Panics
///
/// Methods panic if an internal mutex is poisoned, which only happens after a
/// panic in another test thread holding the lock.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Characters per streamed chunk when a response has no explicit chunks.
    chunk_chars: usize,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        /// Exact streaming chunks; `None` splits `content` evenly.
        chunks: Option<Vec<String>>,
    },
    /// Fail the call before any output.
    Error(MockError),
    /// Stream `chunks`, then fail mid-stream.
    BrokenStream { chunks: Vec<String>, error: MockError },
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u64 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::timeout(timeout_secs),
        }
    }
}

/// A call the provider received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: CompletionRequest,
    pub streaming: bool,
}

impl RecordedCall {
    /// System prompt of the call, or `""`.
    pub fn system_prompt(&self) -> &str {
        self.request.system_prompt.as_deref().unwrap_or_default()
    }

    /// Last user message of the call, or `""`.
    pub fn user_message(&self) -> &str {
        self.request.last_user_message().unwrap_or_default()
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            chunk_chars: DEFAULT_CHUNK_CHARS,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            chunks: None,
        })
    }

    /// Adds a successful response streamed as exactly these chunks.
    pub fn with_stream_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks: Vec<String> = chunks.into_iter().map(Into::into).collect();
        self.push(MockResponse::Success {
            content: chunks.concat(),
            chunks: Some(chunks),
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a stream that yields `chunks` and then fails.
    pub fn with_broken_stream<I, S>(self, chunks: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        self.push(MockResponse::BrokenStream { chunks, error })
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets how many characters each streamed chunk carries by default.
    pub fn with_chunk_size(mut self, chars: usize) -> Self {
        self.chunk_chars = chars.max(1);
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.lock_calls().clear();
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .push_back(response);
        self
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().expect("mock call log poisoned")
    }

    fn record(&self, request: CompletionRequest, streaming: bool) {
        self.lock_calls().push(RecordedCall { request, streaming });
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                chunks: None,
            })
    }

    fn split_chunks(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        chars
            .chunks(self.chunk_chars)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }

    fn usage_for(content: &str) -> TokenUsage {
        TokenUsage::new(10, (content.chars().count() / 4).max(1) as u32)
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.record(request, false);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { content, .. } => Ok(CompletionResponse {
                usage: Self::usage_for(&content),
                content,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
            MockResponse::BrokenStream { error, .. } => Err(error.into()),
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError> {
        self.record(request, true);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { content, chunks } => {
                let chunks = chunks.unwrap_or_else(|| self.split_chunks(&content));
                let usage = Self::usage_for(&content);
                let items: Vec<Result<StreamChunk, AIError>> = chunks
                    .into_iter()
                    .map(|c| Ok(StreamChunk::content(c)))
                    .chain(std::iter::once(Ok(StreamChunk::final_chunk(
                        FinishReason::Stop,
                        usage,
                    ))))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            MockResponse::BrokenStream { chunks, error } => {
                let items: Vec<Result<StreamChunk, AIError>> = chunks
                    .into_iter()
                    .map(|c| Ok(StreamChunk::content(c)))
                    .collect();
                let failure = stream::once(async move { Err(AIError::from(error)) });
                Ok(Box::pin(stream::iter(items).chain(failure)))
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChatId, UserId};
    use crate::ports::{MessageRole, RequestMetadata};
    use futures::StreamExt;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(
            UserId::new("test-user").unwrap(),
            ChatId::new(),
            "trace-123",
        ))
        .with_message(MessageRole::User, "Hello")
    }

    async fn collect_text(mut stream: CompletionStream) -> (Vec<String>, Option<AIError>) {
        let mut chunks = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) if chunk.is_final() => {}
                Ok(chunk) => chunks.push(chunk.delta),
                Err(err) => return (chunks, Some(err)),
            }
        }
        (chunks, None)
    }

    #[tokio::test]
    async fn returns_responses_in_order_then_default() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "First");
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Second");
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Mock response");
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockAIProvider::new().with_error(MockError::RateLimited {
            retry_after_secs: 30,
        });

        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn records_calls_with_streaming_flag() {
        let provider = MockAIProvider::new();

        provider.complete(test_request()).await.unwrap();
        let _ = provider.stream_complete(test_request()).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].streaming);
        assert!(calls[1].streaming);
        assert_eq!(calls[0].user_message(), "Hello");

        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn streams_explicit_chunks_exactly() {
        let provider = MockAIProvider::new().with_stream_chunks(["Look: <gra", "ph>y</graph>"]);

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (chunks, error) = collect_text(stream).await;

        assert_eq!(chunks, vec!["Look: <gra", "ph>y</graph>"]);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn splits_plain_responses_without_losing_text() {
        let provider = MockAIProvider::new()
            .with_chunk_size(3)
            .with_response("héllo wörld");

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (chunks, _) = collect_text(stream).await;

        assert_eq!(chunks.concat(), "héllo wörld");
        assert_eq!(chunks[0], "hél");
    }

    #[tokio::test]
    async fn broken_stream_fails_after_chunks() {
        let provider = MockAIProvider::new().with_broken_stream(
            ["partial "],
            MockError::Network {
                message: "reset".to_string(),
            },
        );

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (chunks, error) = collect_text(stream).await;

        assert_eq!(chunks, vec!["partial "]);
        assert!(matches!(error, Some(AIError::Network(_))));
    }

    #[tokio::test]
    async fn respects_delay() {
        let provider = MockAIProvider::new()
            .with_response("Delayed")
            .with_delay(Duration::from_millis(30));

        let start = std::time::Instant::now();
        provider.complete(test_request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::Timeout { timeout_secs: 30 }.into();
        assert!(matches!(err, AIError::Timeout { timeout_secs: 30 }));

        let err: AIError = MockError::AuthenticationFailed.into();
        assert!(matches!(err, AIError::AuthenticationFailed));
    }
}
