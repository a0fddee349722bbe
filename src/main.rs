//! # LLM Stream Relay
//!
//! Terminal front end for the streaming inference relay: sends one chat
//! prompt to a provider and streams the normalized output to stdout.
//!
//! ## Usage
//!
//! ```bash
//! # DeepSeek (static key)
//! DEEPSEEK_API_KEY=sk-... llm-stream-relay deepseek deepseek-reasoner "why is the sky blue?"
//!
//! # Zhipu (signed token, key format {id}.{secret})
//! ZHIPU_API_KEY=id.secret llm-stream-relay zhipu glm-4 "hello"
//! ```

use futures_util::StreamExt;
use relay_core::{ChatRequest, Message, ProviderKind};
use relay_gateway::ChatGateway;
use relay_telemetry::{init_logging, LoggingConfig};
use std::env;
use std::io::Write;
use tracing::error;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = init_logging(&LoggingConfig::new().with_level("warn")) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Relay call failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let [_, provider_name, model, prompt] = args.as_slice() else {
        eprintln!("usage: llm-stream-relay <zhipu|deepseek> <model> <prompt>");
        std::process::exit(2);
    };

    let provider: ProviderKind = provider_name.parse()?;
    let secret = match provider {
        ProviderKind::Zhipu => env::var("ZHIPU_API_KEY").unwrap_or_default(),
        ProviderKind::DeepSeek => env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
    };

    let request = ChatRequest::builder()
        .model(model.clone())
        .message(Message::user(prompt.clone()))
        .build()?;

    let gateway = ChatGateway::new()?;
    let mut chunks = gateway.stream_chat(provider, &secret, &request).await?;

    let mut stdout = std::io::stdout();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if chunk.is_done() {
            break;
        }
        stdout.write_all(&chunk.bytes)?;
        stdout.flush()?;
    }
    stdout.write_all(b"\n")?;

    Ok(())
}
