//! Gateway-scoped signed-token cache.
//!
//! Signed tokens are valid for an hour; re-signing on every outbound call
//! is wasted work. The cache is injected into the gateway instance (never a
//! module-level singleton), keyed by provider plus secret identity, and
//! guarded by a lock. Entries are re-signed once they come within the
//! refresh margin of expiry.

use crate::token::SignedToken;
use chrono::Utc;
use parking_lot::Mutex;
use relay_core::{ProviderKind, RelayResult};
use std::collections::HashMap;
use tracing::debug;

/// Seconds of headroom before expiry at which a cached token is re-signed.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Lock-guarded cache of signed tokens, keyed by provider + secret.
#[derive(Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, SignedToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh token for the given secret, signing a new one if the
    /// cached entry is missing or within the refresh margin of expiry.
    ///
    /// # Errors
    /// Returns error if signing fails.
    pub fn get_or_issue(
        &self,
        provider: ProviderKind,
        api_key_id: &str,
        signing_secret: &str,
    ) -> RelayResult<SignedToken> {
        self.get_or_issue_at(provider, api_key_id, signing_secret, Utc::now().timestamp())
    }

    /// [`Self::get_or_issue`] against an explicit clock.
    ///
    /// # Errors
    /// Returns error if signing fails.
    pub fn get_or_issue_at(
        &self,
        provider: ProviderKind,
        api_key_id: &str,
        signing_secret: &str,
        now: i64,
    ) -> RelayResult<SignedToken> {
        let key = format!("{provider}:{api_key_id}.{signing_secret}");

        let mut entries = self.entries.lock();
        if let Some(token) = entries.get(&key) {
            if token.is_fresh_at(now, REFRESH_MARGIN_SECS) {
                debug!(%provider, "Reusing cached signed token");
                return Ok(token.clone());
            }
        }

        let token = SignedToken::issue_at(api_key_id, signing_secret, now)?;
        debug!(%provider, expires_at = token.expires_at(), "Signed new token");
        entries.insert(key, token.clone());
        Ok(token)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("entries", &self.len())
            .finish()
    }
}
