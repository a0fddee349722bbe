//! The provider adapter seam.
//!
//! An adapter owns everything provider-specific about a call: the endpoint,
//! the request-body mapping, and the event decoder for the provider's
//! stream schema. Decoders are fixed at adapter construction time; the
//! transcoder never probes event shapes dynamically.

use relay_core::{ChatRequest, ProviderKind, RelayResult, StreamEvent};
use std::sync::Arc;

/// Decodes one `data:` payload into a normalized [`StreamEvent`].
pub trait EventDecoder: Send + Sync {
    /// Decode a single event's JSON. Failures are reported to the caller,
    /// which skips the event; they must never abort the stream.
    ///
    /// # Errors
    /// Returns the JSON decode error for the event.
    fn decode(&self, data: &str) -> Result<StreamEvent, serde_json::Error>;
}

/// Maps normalized chat requests into one provider's wire format.
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Full chat-completions endpoint URL.
    fn endpoint(&self) -> String;

    /// Build the provider-specific request body. Pure transformation; no
    /// I/O side effects. Streaming is always requested.
    ///
    /// # Errors
    /// Returns error if the body cannot be serialized.
    fn request_body(&self, request: &ChatRequest) -> RelayResult<serde_json::Value>;

    /// The decoder for this provider's stream event schema.
    fn decoder(&self) -> Arc<dyn EventDecoder>;
}
