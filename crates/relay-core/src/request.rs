//! The provider-agnostic chat request.
//!
//! This is the normalized form the relay accepts from callers. It is
//! immutable once built; request adapters map it into provider-specific
//! wire bodies without mutating it.

use serde::{Deserialize, Serialize};

/// A normalized chat request: generation settings plus an ordered message
/// list. Built via [`ChatRequest::builder`], validated on build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Generation settings for this call.
    pub settings: GenerationSettings,

    /// Ordered conversation messages.
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Create a new builder for `ChatRequest`.
    #[must_use]
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

/// Generation settings carried alongside the message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Target model identifier (e.g. "glm-4", "deepseek-reasoner").
    pub model_id: String,

    /// Sampling temperature (0.0 - 2.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Whether the caller wants incremental output.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

/// Builder for [`ChatRequest`].
#[derive(Debug, Default)]
pub struct ChatRequestBuilder {
    model_id: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    stream: Option<bool>,
    messages: Vec<Message>,
}

impl ChatRequestBuilder {
    /// Set the model.
    #[must_use]
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Set the temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max_tokens.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enable or disable streaming (defaults to enabled).
    #[must_use]
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Set the messages.
    #[must_use]
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Add a message.
    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Build the request.
    ///
    /// # Errors
    /// Returns error if the model is missing, the message list is empty, or
    /// the temperature is out of range.
    pub fn build(self) -> Result<ChatRequest, crate::error::RelayError> {
        let model_id = self
            .model_id
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| crate::error::RelayError::internal("model is required"))?;

        if self.messages.is_empty() {
            return Err(crate::error::RelayError::internal(
                "messages cannot be empty",
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(crate::error::RelayError::internal(format!(
                    "temperature must be between 0.0 and 2.0, got {t}"
                )));
            }
        }

        Ok(ChatRequest {
            settings: GenerationSettings {
                model_id,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stream: self.stream.unwrap_or(true),
            },
            messages: self.messages,
        })
    }
}

/// A chat message with role and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,

    /// Content of the message.
    pub content: MessageContent,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Get the text content if this is a plain-text message.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message.
    System,
    /// User message.
    User,
    /// Assistant message.
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message content: plain text or ordered multimodal parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text(String),
    /// Ordered multimodal content parts.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Get as text if this is a text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Parts(_) => None,
        }
    }

    /// Check if content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Content part for multimodal messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content part.
    Text {
        /// The text content.
        text: String,
    },
    /// Image reference part.
    ImageUrl {
        /// Image reference details.
        image_url: ImageRef,
    },
}

/// Image reference for multimodal providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    /// URL of the image.
    pub url: String,
}
