//! Conversation core for the chatbot.
//!
//! Provides:
//! - a Gemini API client with SSE streaming
//! - a per-thread conversation store
//! - history windowing (trimming) under a token budget
//! - system prompt assembly with language substitution
//! - the conversation engine that ties them together per thread

pub mod gemini;
pub mod prompt;
pub mod session;
pub mod store;
pub mod streaming;
pub mod window;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

pub use gemini::{GeminiClient, GeminiConfig};
pub use prompt::PromptTemplate;
pub use session::{ChatEngine, ReplyStream, TurnState};
pub use store::{ConversationStore, InMemoryStore};
pub use window::{trim_window, window_cost, ApproxTokenCounter, TokenCounter, WindowPolicy};

/// Lazy, finite sequence of events for one model invocation.
///
/// Dropping the stream abandons the invocation and releases the
/// underlying connection.
pub type ChunkStream = BoxStream<'static, Result<StreamEvent, AiError>>;

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Start a streamed generation for `messages`.
    async fn stream_message(&self, messages: &[Message]) -> Result<ChunkStream, AiError>;

    /// Run a generation to completion and return the concatenated reply.
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        let stream = self.stream_message(messages).await?;
        collect_response(stream).await
    }

    /// Model identifier, for logs and the info endpoint.
    fn model_name(&self) -> &str;
}

/// Drain a chunk stream, keeping assistant text in arrival order.
pub async fn collect_response(mut stream: ChunkStream) -> Result<AiResponse, AiError> {
    let mut response = AiResponse::default();
    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Delta(text) => response.content.push_str(&text),
            StreamEvent::Usage(usage) => response.usage = usage,
        }
    }
    Ok(response)
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One item of a streamed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text produced by the model.
    Delta(String),
    /// Token accounting reported by the service.
    Usage(TokenUsage),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else {
            AiError::NetworkError(err.to_string())
        }
    }
}

impl From<AiError> for chatbot_common::ChatbotError {
    fn from(err: AiError) -> Self {
        chatbot_common::ChatbotError::Ai(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hi").role, Role::Assistant);
        assert_eq!(Message::system("hi").role, Role::System);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }

    #[test]
    fn token_usage_total_saturates() {
        let usage = TokenUsage {
            input_tokens: u64::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total_tokens(), u64::MAX);
    }

    #[test]
    fn ai_error_converts_to_chatbot_error() {
        let err: chatbot_common::ChatbotError = AiError::RateLimited.into();
        assert_eq!(err.to_string(), "ai error: Rate limited");
    }

    #[tokio::test]
    async fn collect_response_keeps_only_text_in_order() {
        let events = vec![
            Ok(StreamEvent::Delta("Hel".into())),
            Ok(StreamEvent::Usage(TokenUsage {
                input_tokens: 4,
                output_tokens: 2,
            })),
            Ok(StreamEvent::Delta("lo".into())),
        ];
        let stream: ChunkStream = Box::pin(futures_util::stream::iter(events));
        let response = collect_response(stream).await.unwrap();
        assert_eq!(response.content, "Hello");
        assert_eq!(response.usage.total_tokens(), 6);
    }

    #[tokio::test]
    async fn collect_response_propagates_stream_error() {
        let events = vec![
            Ok(StreamEvent::Delta("partial".into())),
            Err(AiError::NetworkError("reset".into())),
        ];
        let stream: ChunkStream = Box::pin(futures_util::stream::iter(events));
        let err = collect_response(stream).await.unwrap_err();
        assert!(matches!(err, AiError::NetworkError(_)));
    }
}
