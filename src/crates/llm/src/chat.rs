//! Provider-agnostic chat types and the [`ChatModel`] trait.
//!
//! Every client in this crate converts these types to and from its provider's
//! wire format. Callers hold models as `Arc<dyn ChatModel>` so a single client
//! can be shared by concurrent requests.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Human,
    Assistant,
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Text content of the message.
    pub fn text(&self) -> &str {
        &self.content
    }
}

/// A request to a chat model.
///
/// ```rust,ignore
/// let request = ChatRequest::new(vec![
///     Message::system("You are a patient tutor"),
///     Message::human("Explain photosynthesis to a ten year old"),
/// ])
/// .with_temperature(0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send to the model.
    pub messages: Vec<Message>,

    /// Sampling temperature. Falls back to the client's configured value.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Create a new chat request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    /// Set the temperature for generation.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl UsageMetadata {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// A complete response from a chat model.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant message.
    pub message: Message,

    /// Token usage, when the provider reports it.
    pub usage: Option<UsageMetadata>,
}

impl ChatResponse {
    /// Build a response carrying only assistant text and usage.
    pub fn new(text: impl Into<String>, usage: Option<UsageMetadata>) -> Self {
        Self {
            message: Message::assistant(text),
            usage,
        }
    }

    /// Assistant text of the response.
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// Input and output token counts, zero when usage was not reported.
    pub fn token_counts(&self) -> (usize, usize) {
        self.usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or((0, 0))
    }
}

/// Core trait for chat-based language models.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` and driven from spawned tasks.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete chat response from messages.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
