use std::pin::Pin;

use crate::errors::CompletionError;

/// Role of a chat message sent to a completion provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One chat-style message in a completion request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request parameters shared by streaming and non-streaming completion calls.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request from a prepared message list.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.3,
            max_tokens: 2000,
        }
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the completion token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Lazy, finite, non-restartable sequence of answer text fragments.
///
/// Concatenating the `Ok` items in order reconstructs the text produced so
/// far; an `Err` item means the transport failed mid-stream.
pub type DeltaStream =
    Pin<Box<dyn futures::Stream<Item = Result<String, CompletionError>> + Send + 'static>>;

/// Completion backend abstraction implemented by vendor adapters.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Opens a streaming completion and returns its delta stream.
    ///
    /// Failing to open the stream is the only fatal completion failure in the
    /// pipeline; everything after a successful open degrades.
    async fn start_stream(&self, request: CompletionRequest)
    -> Result<DeltaStream, CompletionError>;

    /// Runs a single non-streaming completion and returns the full text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
