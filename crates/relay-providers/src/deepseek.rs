//! DeepSeek adapter.
//!
//! DeepSeek uses a static bearer key and plain-text message content, and
//! its reasoner models stream two channels per event: `reasoning_content`
//! (intermediate thinking) and `content` (the final answer).

use crate::adapter::{EventDecoder, ProviderAdapter};
use relay_core::{
    ChatRequest, ContentPart, Message, MessageContent, MessageRole, ProviderKind, RelayError,
    RelayResult, StreamEvent, Usage,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Chat completions path under the base URL.
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// DeepSeek provider adapter.
#[derive(Debug, Clone)]
pub struct DeepSeekAdapter {
    base_url: String,
}

impl DeepSeekAdapter {
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

    fn map_message(message: &Message) -> DeepSeekMessage {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        // DeepSeek takes plain strings; multimodal parts are flattened to
        // their text segments.
        let content = match &message.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        };

        DeepSeekMessage {
            role: role.to_string(),
            content,
        }
    }
}

impl Default for DeepSeekAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for DeepSeekAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }

    fn endpoint(&self) -> String {
        format!("{}{CHAT_COMPLETIONS_PATH}", self.base_url)
    }

    fn request_body(&self, request: &ChatRequest) -> RelayResult<serde_json::Value> {
        let body = DeepSeekChatRequest {
            model: request.settings.model_id.clone(),
            messages: request.messages.iter().map(Self::map_message).collect(),
            temperature: request.settings.temperature,
            max_tokens: request.settings.max_tokens,
            stream: true,
        };

        serde_json::to_value(&body).map_err(|e| {
            RelayError::internal(format!("Failed to serialize DeepSeek request: {e}"))
        })
    }

    fn decoder(&self) -> Arc<dyn EventDecoder> {
        Arc::new(DeepSeekEventDecoder)
    }
}

/// Decoder for DeepSeek stream chunks, including the reasoning channel.
#[derive(Debug, Clone, Copy)]
pub struct DeepSeekEventDecoder;

impl EventDecoder for DeepSeekEventDecoder {
    fn decode(&self, data: &str) -> Result<StreamEvent, serde_json::Error> {
        let chunk: DeepSeekStreamChunk = serde_json::from_str(data)?;

        let mut event = StreamEvent::default();
        if let Some(choice) = chunk.choices.into_iter().next() {
            event.delta_text = choice.delta.content;
            event.delta_reasoning = choice.delta.reasoning_content;
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
// DeepSeek API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct DeepSeekChatRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DeepSeekStreamChunk {
    #[serde(default)]
    choices: Vec<DeepSeekChunkChoice>,
    #[serde(default)]
    usage: Option<DeepSeekUsage>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChunkChoice {
    #[serde(default)]
    delta: DeepSeekChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepSeekChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ============================================================================
// Tests
// ============================================================================
