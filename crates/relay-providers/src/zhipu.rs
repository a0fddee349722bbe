//! Zhipu AI (bigmodel.cn) adapter.
//!
//! Zhipu speaks an OpenAI-style chat-completions wire format with two
//! provider quirks: authorization is a signed token rather than the stored
//! key, and multimodal input is expressed as an ordered content-block
//! array. A user message whose text carries an inline Markdown image
//! reference is split into a text block (markup stripped) followed by an
//! `image_url` block.

use crate::adapter::{EventDecoder, ProviderAdapter};
use once_cell::sync::Lazy;
use regex::Regex;
use relay_core::{
    ChatRequest, ContentPart, Message, MessageContent, MessageRole, ProviderKind, RelayError,
    RelayResult, StreamEvent, Usage,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn";

/// Chat completions path under the base URL.
const CHAT_COMPLETIONS_PATH: &str = "/api/paas/v4/chat/completions";

/// Markdown image syntax: `![alt](url)`.
static IMAGE_MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("valid image regex"));

/// Zhipu provider adapter.
#[derive(Debug, Clone)]
pub struct ZhipuAdapter {
    base_url: String,
}

impl ZhipuAdapter {
    /// Create an adapter pointing at the production endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (for tests and private endpoints).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn map_message(message: &Message) -> ZhipuMessage {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        let content = match &message.content {
            MessageContent::Text(text) => {
                if message.role == MessageRole::User {
                    split_inline_image(text)
                } else {
                    ZhipuContent::Text(text.clone())
                }
            }
            MessageContent::Parts(parts) => ZhipuContent::Parts(
                parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => ZhipuContentPart::Text { text: text.clone() },
                        ContentPart::ImageUrl { image_url } => ZhipuContentPart::ImageUrl {
                            image_url: ZhipuImageUrl {
                                url: image_url.url.clone(),
                            },
                        },
                    })
                    .collect(),
            ),
        };

        ZhipuMessage {
            role: role.to_string(),
            content,
        }
    }
}

impl Default for ZhipuAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for ZhipuAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Zhipu
    }

    fn endpoint(&self) -> String {
        format!("{}{CHAT_COMPLETIONS_PATH}", self.base_url)
    }

    fn request_body(&self, request: &ChatRequest) -> RelayResult<serde_json::Value> {
        let body = ZhipuChatRequest {
            model: request.settings.model_id.clone(),
            messages: request.messages.iter().map(Self::map_message).collect(),
            temperature: request.settings.temperature,
            max_tokens: request.settings.max_tokens,
            stream: true,
        };

        serde_json::to_value(&body)
            .map_err(|e| RelayError::internal(format!("Failed to serialize Zhipu request: {e}")))
    }

    fn decoder(&self) -> Arc<dyn EventDecoder> {
        Arc::new(ZhipuEventDecoder)
    }
}

/// Split a user message on its first inline Markdown image, if any.
fn split_inline_image(text: &str) -> ZhipuContent {
    let Some(captures) = IMAGE_MARKDOWN.captures(text) else {
        return ZhipuContent::Text(text.to_string());
    };

    let url = captures.get(1).map_or("", |m| m.as_str()).to_string();
    let stripped = IMAGE_MARKDOWN.replace(text, "").into_owned();

    ZhipuContent::Parts(vec![
        ZhipuContentPart::Text { text: stripped },
        ZhipuContentPart::ImageUrl {
            image_url: ZhipuImageUrl { url },
        },
    ])
}

/// Decoder for Zhipu's OpenAI-style stream chunks.
#[derive(Debug, Clone, Copy)]
pub struct ZhipuEventDecoder;

impl EventDecoder for ZhipuEventDecoder {
    fn decode(&self, data: &str) -> Result<StreamEvent, serde_json::Error> {
        let chunk: ZhipuStreamChunk = serde_json::from_str(data)?;

        let mut event = StreamEvent::default();
        if let Some(choice) = chunk.choices.into_iter().next() {
            event.delta_text = choice.delta.content;
            event.finish_reason = choice.finish_reason;
        }
        event.usage = chunk.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(event)
    }
}

// ============================================================================
// Zhipu API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ZhipuChatRequest {
    model: String,
    messages: Vec<ZhipuMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ZhipuMessage {
    role: String,
    content: ZhipuContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ZhipuContent {
    Text(String),
    Parts(Vec<ZhipuContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ZhipuContentPart {
    Text { text: String },
    ImageUrl { image_url: ZhipuImageUrl },
}

#[derive(Debug, Serialize)]
struct ZhipuImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ZhipuStreamChunk {
    #[serde(default)]
    choices: Vec<ZhipuChunkChoice>,
    #[serde(default)]
    usage: Option<ZhipuUsage>,
}

#[derive(Debug, Deserialize)]
struct ZhipuChunkChoice {
    #[serde(default)]
    delta: ZhipuChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ZhipuChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZhipuUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ============================================================================
// Tests
// ============================================================================
