//! AIProvider port - the model-call capability handed to the tool subsystem.
//!
//! Tool orchestration is provider-agnostic. It only ever changes two things
//! on a request it was given, the system prompt and the conversation, and
//! reads back plain text. Three kinds of call go through this port:
//!
//! | Call              | Method            | Conversation                  |
//! |-------------------|-------------------|-------------------------------|
//! | Stage 1 selection | `complete`        | last user message only        |
//! | Final generation  | `stream_complete` | full history                  |
//! | Nested tool call  | `complete`        | marker context or recovery    |
//!
//! Nested calls are derived with [`CompletionRequest::for_nested_call`], so
//! model, sampling options and tracing metadata carry over unchanged.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode, UserId};

/// Text deltas of a streaming completion, ending with a final chunk.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AIError>> + Send>>;

/// Model-call capability.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// One-shot completion; streaming is off.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Streaming completion. Errors before the first chunk are returned
    /// directly; later ones arrive inside the stream.
    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError>;

    /// Name and model, for logs.
    fn provider_info(&self) -> ProviderInfo;
}

// -----------------------------------------------------------------------------
// Requests
// -----------------------------------------------------------------------------

/// A provider-neutral completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation, oldest first.
    pub messages: Vec<Message>,
    /// System prompt; for a tool-aware generation this starts as the base prompt.
    pub system_prompt: Option<String>,
    /// Model override; `None` lets the provider decide.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            model: None,
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    /// Appends one turn.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    /// Replaces the conversation.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Content of the latest user turn, skipping any trailing assistant turns.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// Single-turn request sharing this request's options and metadata.
    pub fn for_nested_call(
        &self,
        system_prompt: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            messages: vec![Message::user(user_message)],
            system_prompt: Some(system_prompt.into()),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            metadata: self.metadata.clone(),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Who asked, in which chat, under which trace. Copied onto every nested call.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(user_id: UserId, chat_id: ChatId, trace_id: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            trace_id: trace_id.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Responses
// -----------------------------------------------------------------------------

/// Result of a one-shot completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
    /// Model that actually answered.
    pub model: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Cut off at `max_tokens`.
    Length,
    ContentFilter,
}

/// One item of a [`CompletionStream`].
///
/// Content chunks carry a delta; the final chunk carries the finish reason
/// and usage, with an empty delta.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub delta: String,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
            usage: None,
        }
    }

    pub fn final_chunk(finish_reason: FinishReason, usage: TokenUsage) -> Self {
        Self {
            delta: String::new(),
            finish_reason: Some(finish_reason),
            usage: Some(usage),
        }
    }

    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Provider identity, as shown in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Model-call failures.
///
/// Inside the tool subsystem every variant is handled the same way (the
/// call degrades to its fallback text); the distinction matters to callers
/// of the final generation.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// Transient failures a caller may retry. The tool subsystem never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}

impl From<AIError> for DomainError {
    fn from(err: AIError) -> Self {
        let retryable = err.is_retryable();
        DomainError::new(ErrorCode::AIProviderError, err.to_string())
            .with_detail("retryable", retryable.to_string())
    }
}
