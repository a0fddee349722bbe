//! End-to-end streaming through the gateway against mock upstreams:
//! section ordering, sentinel handling, malformed events, and the shape
//! of the request placed on the wire.

use crate::{deepseek_sse_body, zhipu_sse_body, MockDeepSeek, MockZhipu};
use futures::StreamExt;
use relay_core::{ChatRequest, ChunkKind, Message, OutputChunk, ProviderKind, RelayError};
use relay_gateway::ChatGateway;
use relay_providers::{DeepSeekAdapter, ZhipuAdapter};
use std::sync::Arc;

fn request() -> ChatRequest {
    ChatRequest::builder()
        .model("test-model")
        .message(Message::user("hello"))
        .build()
        .expect("build request")
}

fn gateway_for_zhipu(mock: &MockZhipu) -> ChatGateway {
    ChatGateway::builder()
        .adapter(Arc::new(ZhipuAdapter::new().with_base_url(mock.url())))
        .build()
        .expect("gateway")
}

fn gateway_for_deepseek(mock: &MockDeepSeek) -> ChatGateway {
    ChatGateway::builder()
        .adapter(Arc::new(DeepSeekAdapter::new().with_base_url(mock.url())))
        .build()
        .expect("gateway")
}

async fn collect(
    gateway: &ChatGateway,
    provider: ProviderKind,
    secret: &str,
    request: &ChatRequest,
) -> Vec<OutputChunk> {
    let stream = gateway
        .stream_chat(provider, secret, request)
        .await
        .expect("stream opens");
    stream
        .map(|r| r.expect("no transport error"))
        .collect()
        .await
}

fn kinds(chunks: &[OutputChunk]) -> Vec<ChunkKind> {
    chunks.iter().map(|c| c.kind).collect()
}

fn text(chunks: &[OutputChunk]) -> String {
    chunks
        .iter()
        .map(|c| String::from_utf8_lossy(&c.bytes).into_owned())
        .collect()
}

#[tokio::test]
async fn test_zhipu_content_stream_end_to_end() {
    let mock = MockZhipu::new().await;
    mock.mock_stream(&["Hello", ", ", "world"]).await;

    let gateway = gateway_for_zhipu(&mock);
    let chunks = collect(&gateway, ProviderKind::Zhipu, "id.secret", &request()).await;

    assert_eq!(
        kinds(&chunks),
        vec![
            ChunkKind::AnswerText,
            ChunkKind::AnswerText,
            ChunkKind::AnswerText,
            ChunkKind::Done,
        ]
    );
    assert_eq!(text(&chunks), "Hello, world");
}

#[tokio::test]
async fn test_deepseek_reasoning_then_answer_sections() {
    let mock = MockDeepSeek::new().await;
    mock.mock_stream(&["Let me ", "think."], &["The answer ", "is 4."])
        .await;

    let gateway = gateway_for_deepseek(&mock);
    let chunks = collect(&gateway, ProviderKind::DeepSeek, "sk-test", &request()).await;

    assert_eq!(
        kinds(&chunks),
        vec![
            ChunkKind::ReasoningHeader,
            ChunkKind::ReasoningText,
            ChunkKind::ReasoningText,
            ChunkKind::AnswerHeader,
            ChunkKind::AnswerText,
            ChunkKind::AnswerText,
            ChunkKind::Done,
        ]
    );
    assert_eq!(
        text(&chunks),
        "**Reasoning:**\nLet me think.\n\n**Answer:**\nThe answer is 4."
    );
}

#[tokio::test]
async fn test_deepseek_answer_only_has_no_headers() {
    let mock = MockDeepSeek::new().await;
    mock.mock_stream(&[], &["plain answer"]).await;

    let gateway = gateway_for_deepseek(&mock);
    let chunks = collect(&gateway, ProviderKind::DeepSeek, "sk-test", &request()).await;

    assert_eq!(kinds(&chunks), vec![ChunkKind::AnswerText, ChunkKind::Done]);
    assert_eq!(text(&chunks), "plain answer");
}

#[tokio::test]
async fn test_malformed_event_mid_stream_is_skipped() {
    let mock = MockDeepSeek::new().await;
    let body = format!(
        "data: {}\n\ndata: {{oops not json}}\n\ndata: {}\n\ndata: [DONE]\n\n",
        crate::deepseek_stream_chunk(None, Some("before"), None),
        crate::deepseek_stream_chunk(None, Some("after"), None),
    );
    mock.mock_stream_body(&body).await;

    let gateway = gateway_for_deepseek(&mock);
    let chunks = collect(&gateway, ProviderKind::DeepSeek, "sk-test", &request()).await;

    assert_eq!(text(&chunks), "beforeafter");
    assert!(chunks.last().map(OutputChunk::is_done).unwrap_or(false));
}

#[tokio::test]
async fn test_events_after_sentinel_are_ignored() {
    let mock = MockZhipu::new().await;
    let body = format!(
        "data: [DONE]\n\n{}",
        zhipu_sse_body(&["never seen"], true)
    );
    mock.mock_stream_body(&body).await;

    let gateway = gateway_for_zhipu(&mock);
    let chunks = collect(&gateway, ProviderKind::Zhipu, "id.secret", &request()).await;

    assert_eq!(kinds(&chunks), vec![ChunkKind::Done]);
}

#[tokio::test]
async fn test_eof_without_sentinel_still_terminates() {
    let mock = MockZhipu::new().await;
    // Content deltas only; no finish event, no sentinel.
    mock.mock_stream_body(
        "data: {\"choices\":[{\"delta\":{\"content\":\"cut \"},\"finish_reason\":null}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"short\"},\"finish_reason\":null}]}\n\n",
    )
    .await;

    let gateway = gateway_for_zhipu(&mock);
    let chunks = collect(&gateway, ProviderKind::Zhipu, "id.secret", &request()).await;

    assert_eq!(text(&chunks), "cut short");
    assert!(chunks.last().map(OutputChunk::is_done).unwrap_or(false));
}

#[tokio::test]
async fn test_request_body_shape_on_wire() {
    let mock = MockDeepSeek::new().await;
    mock.mock_stream(&[], &["ok"]).await;

    let gateway = gateway_for_deepseek(&mock);
    let request = ChatRequest::builder()
        .model("deepseek-reasoner")
        .message(Message::system("be brief"))
        .message(Message::user("hi"))
        .temperature(0.7)
        .max_tokens(256)
        .build()
        .expect("build request");
    collect(&gateway, ProviderKind::DeepSeek, "sk-test", &request).await;

    let requests = mock.received().await;
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().expect("json body");

    assert_eq!(body["model"], "deepseek-reasoner");
    assert_eq!(body["stream"], true);
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 256);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "hi");
    assert_eq!(
        requests[0].headers.get("content-type").map(|v| v.as_bytes()),
        Some(b"application/json".as_slice())
    );
}

#[tokio::test]
async fn test_zhipu_inline_image_split_on_wire() {
    let mock = MockZhipu::new().await;
    mock.mock_stream(&["A cat."]).await;

    let gateway = gateway_for_zhipu(&mock);
    let request = ChatRequest::builder()
        .model("glm-4v")
        .message(Message::user(
            "What is in this picture? ![photo](https://example.com/cat.jpg)",
        ))
        .build()
        .expect("build request");
    collect(&gateway, ProviderKind::Zhipu, "id.secret", &request).await;

    let requests = mock.received().await;
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().expect("json body");

    let content = &body["messages"][0]["content"];
    assert!(content.is_array(), "content should be split into parts");
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "What is in this picture? ");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], "https://example.com/cat.jpg");
}

#[tokio::test]
async fn test_done_is_terminal_and_empty() {
    let mock = MockZhipu::new().await;
    mock.mock_stream(&["x"]).await;

    let gateway = gateway_for_zhipu(&mock);
    let mut stream = gateway
        .stream_chat(ProviderKind::Zhipu, "id.secret", &request())
        .await
        .expect("stream opens");

    let mut saw_done = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("no transport error");
        assert!(!saw_done, "no chunks may follow Done");
        if chunk.is_done() {
            assert!(chunk.bytes.is_empty());
            saw_done = true;
        }
    }
    assert!(saw_done);
}

#[tokio::test]
async fn test_stream_without_sentinel_yields_no_errors() {
    let mock = MockDeepSeek::new().await;
    mock.mock_stream_body(&deepseek_sse_body(&["why"], &["begun"], false))
        .await;

    let gateway = gateway_for_deepseek(&mock);
    let chunks: Vec<Result<OutputChunk, RelayError>> = gateway
        .stream_chat(ProviderKind::DeepSeek, "sk-test", &request())
        .await
        .expect("stream opens")
        .collect()
        .await;

    assert!(chunks.iter().all(Result::is_ok));
    let ok: Vec<OutputChunk> = chunks.into_iter().flatten().collect();
    assert!(ok.last().map(OutputChunk::is_done).unwrap_or(false));
}
