//! Mock upstream providers for integration testing
//!
//! Provides wiremock-based mock servers that simulate the Zhipu and
//! DeepSeek chat-completions endpoints, including their SSE stream bodies.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Chat completions path served by the Zhipu mock.
pub const ZHIPU_CHAT_PATH: &str = "/api/paas/v4/chat/completions";

/// Chat completions path served by the DeepSeek mock.
pub const DEEPSEEK_CHAT_PATH: &str = "/v1/chat/completions";

/// Mock Zhipu API server
pub struct MockZhipu {
    pub server: MockServer,
}

impl MockZhipu {
    /// Create a new mock Zhipu server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Requests received by the mock so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Serve a content-only SSE stream ending with the `[DONE]` sentinel
    pub async fn mock_stream(&self, deltas: &[&str]) {
        self.mock_stream_body(&zhipu_sse_body(deltas, true)).await;
    }

    /// Serve a raw SSE body verbatim
    pub async fn mock_stream_body(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path(ZHIPU_CHAT_PATH))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(sse_response(body))
            .mount(&self.server)
            .await;
    }

    /// Serve an error status with a JSON body
    pub async fn mock_error(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(ZHIPU_CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock that must never be called
    pub async fn expect_no_calls(&self) {
        Mock::given(method("POST"))
            .and(path(ZHIPU_CHAT_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// Mock DeepSeek API server
pub struct MockDeepSeek {
    pub server: MockServer,
}

impl MockDeepSeek {
    /// Create a new mock DeepSeek server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Requests received by the mock so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Serve an SSE stream of reasoning deltas followed by content deltas,
    /// ending with the `[DONE]` sentinel
    pub async fn mock_stream(&self, reasoning: &[&str], content: &[&str]) {
        self.mock_stream_body(&deepseek_sse_body(reasoning, content, true))
            .await;
    }

    /// Serve a raw SSE body verbatim
    pub async fn mock_stream_body(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path(DEEPSEEK_CHAT_PATH))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(sse_response(body))
            .mount(&self.server)
            .await;
    }

    /// Serve an error status with a JSON body
    pub async fn mock_error(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(DEEPSEEK_CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serve an error status with a raw (non-JSON) body
    pub async fn mock_error_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(DEEPSEEK_CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock that must never be called
    pub async fn expect_no_calls(&self) {
        Mock::given(method("POST"))
            .and(path(DEEPSEEK_CHAT_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .append_header("Content-Type", "text/event-stream")
}

/// Build a Zhipu SSE body from content deltas
pub fn zhipu_sse_body(deltas: &[&str], with_sentinel: bool) -> String {
    let mut body = String::new();
    for delta in deltas {
        push_data_line(&mut body, &zhipu_stream_chunk(Some(delta), None));
    }
    push_data_line(&mut body, &zhipu_stream_chunk(None, Some("stop")));
    if with_sentinel {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

/// Build a DeepSeek SSE body from reasoning and content deltas
pub fn deepseek_sse_body(reasoning: &[&str], content: &[&str], with_sentinel: bool) -> String {
    let mut body = String::new();
    for delta in reasoning {
        push_data_line(&mut body, &deepseek_stream_chunk(Some(delta), None, None));
    }
    for delta in content {
        push_data_line(&mut body, &deepseek_stream_chunk(None, Some(delta), None));
    }
    push_data_line(&mut body, &deepseek_stream_chunk(None, None, Some("stop")));
    if with_sentinel {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

/// One Zhipu stream chunk in the OpenAI chunk shape
pub fn zhipu_stream_chunk(content: Option<&str>, finish_reason: Option<&str>) -> Value {
    let mut delta = json!({});
    if let Some(content) = content {
        delta["content"] = json!(content);
    }
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "model": "glm-4",
        "choices": [
            {
                "index": 0,
                "delta": delta,
                "finish_reason": finish_reason
            }
        ]
    })
}

/// One DeepSeek stream chunk; reasoning and content ride separate delta fields
pub fn deepseek_stream_chunk(
    reasoning: Option<&str>,
    content: Option<&str>,
    finish_reason: Option<&str>,
) -> Value {
    let mut delta = json!({});
    if let Some(reasoning) = reasoning {
        delta["reasoning_content"] = json!(reasoning);
    }
    if let Some(content) = content {
        delta["content"] = json!(content);
    }
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "model": "deepseek-reasoner",
        "choices": [
            {
                "index": 0,
                "delta": delta,
                "finish_reason": finish_reason
            }
        ]
    })
}

/// OpenAI-style error body, `{"error": {"message": ...}}`
pub fn error_body(message: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": "invalid_request_error",
            "code": null
        }
    })
}

fn push_data_line(body: &mut String, chunk: &Value) {
    body.push_str("data: ");
    body.push_str(&chunk.to_string());
    body.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zhipu_sse_body_shape() {
        let body = zhipu_sse_body(&["Hello", " world"], true);
        assert!(body.starts_with("data: "));
        assert!(body.contains(r#""content":"Hello""#));
        assert!(body.contains(r#""finish_reason":"stop""#));
        assert!(body.ends_with("data: [DONE]\n\n"));
    }

    #[test]
    fn test_deepseek_sse_body_separates_channels() {
        let body = deepseek_sse_body(&["thinking"], &["answer"], false);
        assert!(body.contains(r#""reasoning_content":"thinking""#));
        assert!(body.contains(r#""content":"answer""#));
        assert!(!body.contains("[DONE]"));
    }

    #[tokio::test]
    async fn test_mock_zhipu_serves_stream() {
        let mock = MockZhipu::new().await;
        mock.mock_stream(&["hi"]).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}{ZHIPU_CHAT_PATH}", mock.url()))
            .json(&json!({"model": "glm-4", "stream": true, "messages": []}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.text().await.unwrap();
        assert!(body.contains(r#""content":"hi""#));
        assert!(body.ends_with("data: [DONE]\n\n"));
    }
}
