//! Error taxonomy for the relay.
//!
//! Every variant names the offending provider so user-visible messages can
//! be surfaced without further context. Pre-flight errors (credential and
//! HTTP-status issues) are returned before any output bytes; stream
//! transport failures terminate an already-running chunk sequence.

use crate::provider::ProviderKind;
use thiserror::Error;

/// Result alias using [`RelayError`].
pub type RelayResult<T> = Result<T, RelayError>;

/// User-facing relay errors.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// No credential is stored for the provider.
    #[error("{provider} API Key not found.")]
    MissingCredential {
        /// Provider the credential was looked up for.
        provider: ProviderKind,
    },

    /// The stored secret does not match the provider's expected shape.
    #[error("{provider} API Key is malformed: {message}")]
    InvalidCredentialFormat {
        /// Provider the credential belongs to.
        provider: ProviderKind,
        /// What was wrong with the secret.
        message: String,
    },

    /// The upstream rejected the credential.
    #[error("{provider} API Key is incorrect: {message}")]
    InvalidCredentialValue {
        /// Provider that rejected the credential.
        provider: ProviderKind,
        /// Upstream-supplied detail.
        message: String,
    },

    /// The upstream returned a non-2xx HTTP response.
    #[error("{provider} upstream error ({status}): {message}")]
    UpstreamHttp {
        /// Provider that failed.
        provider: ProviderKind,
        /// Upstream HTTP status code.
        status: u16,
        /// Message extracted from the upstream error body.
        message: String,
    },

    /// The upstream call could not be issued at all (DNS, connect, TLS).
    /// Unlike [`Self::StreamTransport`], no output bytes were produced.
    #[error("{provider} connection failed: {message}")]
    ConnectionFailed {
        /// Provider that could not be reached.
        provider: ProviderKind,
        /// Connection failure detail.
        message: String,
    },

    /// The upstream body could not be decoded at all.
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse {
        /// Provider that failed.
        provider: ProviderKind,
        /// Decode failure detail.
        message: String,
    },

    /// The connection failed mid-stream, after output had begun.
    #[error("{provider} stream transport failure: {message}")]
    StreamTransport {
        /// Provider the stream belonged to.
        provider: ProviderKind,
        /// Transport failure detail.
        message: String,
    },

    /// Internal relay failure (e.g. HTTP client construction).
    #[error("Internal relay error: {message}")]
    Internal {
        /// Failure detail.
        message: String,
    },
}

impl RelayError {
    /// Create a missing-credential error.
    #[must_use]
    pub fn missing_credential(provider: ProviderKind) -> Self {
        Self::MissingCredential { provider }
    }

    /// Create an invalid-credential-format error.
    pub fn invalid_credential_format(
        provider: ProviderKind,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidCredentialFormat {
            provider,
            message: message.into(),
        }
    }

    /// Create an invalid-credential-value error.
    pub fn invalid_credential_value(
        provider: ProviderKind,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidCredentialValue {
            provider,
            message: message.into(),
        }
    }

    /// Create an upstream HTTP error.
    pub fn upstream_http(provider: ProviderKind, status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Create a connection-failed error.
    pub fn connection_failed(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            provider,
            message: message.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed_response(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            message: message.into(),
        }
    }

    /// Create a stream transport error.
    pub fn stream_transport(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::StreamTransport {
            provider,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status to surface to the inbound caller.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingCredential { .. } | Self::InvalidCredentialFormat { .. } => 400,
            Self::InvalidCredentialValue { .. } => 401,
            Self::UpstreamHttp { status, .. } => *status,
            Self::ConnectionFailed { .. }
            | Self::MalformedResponse { .. }
            | Self::StreamTransport { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }

    /// Whether the error occurred before any output bytes were produced.
    #[must_use]
    pub fn is_pre_flight(&self) -> bool {
        !matches!(self, Self::StreamTransport { .. })
    }
}
