//! # Relay Auth
//!
//! Credential resolution for the streaming inference relay.
//!
//! Given a provider and its stored secret, produces the authorization
//! artifact the upstream expects: the secret verbatim for static-key
//! providers, or a freshly signed HMAC-SHA256 token for signing providers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod token;

pub use cache::{TokenCache, REFRESH_MARGIN_SECS};
pub use token::{validate_compact, validate_compact_at, SignedToken, TOKEN_TTL_SECS};

use relay_core::{AuthScheme, ProviderKind, RelayError, RelayResult};
use secrecy::{ExposeSecret, SecretString};

/// An authorization artifact ready to be sent upstream.
#[derive(Debug, Clone)]
pub enum Credential {
    /// The stored secret, sent verbatim.
    StaticKey(SecretString),
    /// A freshly signed, time-bounded token.
    SignedToken(SignedToken),
}

impl Credential {
    /// Render the value placed after `Bearer ` in the Authorization header.
    #[must_use]
    pub fn bearer_value(&self) -> String {
        match self {
            Self::StaticKey(secret) => secret.expose_secret().clone(),
            Self::SignedToken(token) => token.compact(),
        }
    }
}

/// Resolves stored secrets into [`Credential`]s, consulting the injected
/// token cache for signing providers.
#[derive(Debug, Default)]
pub struct CredentialResolver {
    cache: TokenCache,
}

impl CredentialResolver {
    /// Create a resolver with an empty token cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a stored secret for the given provider.
    ///
    /// # Errors
    /// Returns [`RelayError::MissingCredential`] for an empty secret, or
    /// [`RelayError::InvalidCredentialFormat`] when a signing provider's
    /// secret is not of the form `{id}.{secret}`. No network I/O occurs.
    pub fn resolve(&self, provider: ProviderKind, secret: &str) -> RelayResult<Credential> {
        if secret.trim().is_empty() {
            return Err(RelayError::missing_credential(provider));
        }

        match provider.auth_scheme() {
            AuthScheme::StaticKey => Ok(Credential::StaticKey(SecretString::new(
                secret.to_string(),
            ))),
            AuthScheme::SignedToken => {
                let parts: Vec<&str> = secret.split('.').collect();
                let &[id, signing_secret] = parts.as_slice() else {
                    return Err(RelayError::invalid_credential_format(
                        provider,
                        "expected format: {id}.{secret}",
                    ));
                };
                if id.is_empty() || signing_secret.is_empty() {
                    return Err(RelayError::invalid_credential_format(
                        provider,
                        "expected format: {id}.{secret}",
                    ));
                }

                let token = self.cache.get_or_issue(provider, id, signing_secret)?;
                Ok(Credential::SignedToken(token))
            }
        }
    }
}
