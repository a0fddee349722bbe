//! Upstream failure translation.
//!
//! Maps non-2xx upstream responses into the relay's error taxonomy. The
//! message is taken from the upstream JSON error body's `error.message` or
//! `message` field when parseable, else the raw body text, else a generic
//! fallback.

use relay_core::{ProviderKind, RelayError};
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    error: Option<UpstreamErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Extract the best available message from an upstream error body.
fn extract_message(status: u16, body: &str) -> String {
    let fallback = || format!("HTTP error! status: {status}");

    if let Ok(parsed) = serde_json::from_str::<UpstreamErrorBody>(body) {
        if let Some(message) = parsed
            .error
            .and_then(|e| e.message)
            .or(parsed.message)
            .filter(|m| !m.is_empty())
        {
            return message;
        }
    }

    if body.trim().is_empty() {
        fallback()
    } else {
        body.trim().to_string()
    }
}

/// Translate a non-2xx upstream response into a [`RelayError`].
#[must_use]
pub fn upstream_error(provider: ProviderKind, status: u16, body: &str) -> RelayError {
    let message = extract_message(status, body);

    error!(%provider, status, %message, "Upstream API error");

    let lowered = message.to_lowercase();
    if status == 401
        || lowered.contains("incorrect api key")
        || lowered.contains("invalid api key")
    {
        return RelayError::invalid_credential_value(provider, message);
    }

    RelayError::upstream_http(provider, status, message)
}
