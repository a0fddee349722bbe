//! # Relay Core
//!
//! Core types and error handling for the streaming inference relay.
//!
//! This crate provides the foundational types used throughout the relay:
//! - The provider-agnostic chat request
//! - Normalized stream events and output chunks
//! - Provider identifiers
//! - The user-facing error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod request;
pub mod streaming;

// Re-export commonly used types
pub use error::{RelayError, RelayResult};
pub use provider::{AuthScheme, ProviderKind};
pub use request::{
    ChatRequest, ContentPart, GenerationSettings, ImageRef, Message, MessageContent, MessageRole,
};
pub use streaming::{ChunkKind, OutputChunk, StreamEvent, Usage};
