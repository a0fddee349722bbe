//! # Relay Providers
//!
//! Provider adapters and stream transcoding for the streaming inference
//! relay.
//!
//! Each adapter maps the normalized [`relay_core::ChatRequest`] into its
//! provider's wire body and supplies the decoder for that provider's
//! stream-event schema. The transcoder turns an upstream event-stream byte
//! source into the normalized output-chunk sequence.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod deepseek;
pub mod transcode;
pub mod translate;
pub mod zhipu;

// Re-export main types
pub use adapter::{EventDecoder, ProviderAdapter};
pub use deepseek::{DeepSeekAdapter, DeepSeekEventDecoder};
pub use transcode::transcode;
pub use translate::upstream_error;
pub use zhipu::{ZhipuAdapter, ZhipuEventDecoder};
