//! Signed-token construction and validation.
//!
//! Signing providers do not accept their stored secret directly; each
//! outbound call carries a compact, time-bounded token of three base64url
//! (no padding) segments joined by `.`: a header `{"alg":"HS256",
//! "sign_type":"SIGN"}`, a payload `{"api_key", "timestamp", "exp"}`, and
//! an HMAC-SHA256 signature over `header.payload` keyed by the secret half
//! of the stored `{id}.{secret}` credential.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use relay_core::{RelayError, RelayResult};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// A freshly signed, time-bounded upstream credential.
///
/// Never persisted; held in memory only, inside the gateway's token cache.
#[derive(Clone)]
pub struct SignedToken {
    header: String,
    payload: String,
    signature: String,
    expires_at: i64,
}

impl SignedToken {
    /// Sign a token for the given key id, valid for [`TOKEN_TTL_SECS`].
    ///
    /// # Errors
    /// Returns error if the HMAC key cannot be initialized.
    pub fn issue(api_key_id: &str, signing_secret: &str) -> RelayResult<Self> {
        Self::issue_at(api_key_id, signing_secret, Utc::now().timestamp())
    }

    /// Sign a token with an explicit issue time (epoch seconds).
    ///
    /// # Errors
    /// Returns error if the HMAC key cannot be initialized.
    pub fn issue_at(api_key_id: &str, signing_secret: &str, now: i64) -> RelayResult<Self> {
        let expires_at = now + TOKEN_TTL_SECS;

        let header = serde_json::json!({
            "alg": "HS256",
            "sign_type": "SIGN",
        });
        let payload = serde_json::json!({
            "api_key": api_key_id,
            "exp": expires_at,
            "timestamp": now,
        });

        let encoded_header = URL_SAFE_NO_PAD.encode(header.to_string());
        let encoded_payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signing_input = format!("{encoded_header}.{encoded_payload}");

        let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
            .map_err(|e| RelayError::internal(format!("Invalid HMAC key: {e}")))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(Self {
            header: encoded_header,
            payload: encoded_payload,
            signature,
            expires_at,
        })
    }

    /// Render the compact three-segment form sent upstream.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.header, self.payload, self.signature)
    }

    /// Expiry as epoch seconds.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Whether the token is still usable at `now`, keeping `margin` seconds
    /// of headroom before expiry.
    #[must_use]
    pub fn is_fresh_at(&self, now: i64, margin: i64) -> bool {
        now + margin < self.expires_at
    }
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedToken")
            .field("signature", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    exp: i64,
}

/// Check whether a compact token is structurally valid and unexpired.
///
/// Malformed segment counts or decode failures report `false` rather than
/// raising.
#[must_use]
pub fn validate_compact(token: &str) -> bool {
    validate_compact_at(token, Utc::now().timestamp())
}

/// [`validate_compact`] against an explicit clock.
#[must_use]
pub fn validate_compact_at(token: &str, now: i64) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return false;
    }

    let Ok(payload_bytes) = URL_SAFE_NO_PAD.decode(parts[1]) else {
        return false;
    };
    let Ok(payload) = serde_json::from_slice::<TokenPayload>(&payload_bytes) else {
        return false;
    };

    payload.exp > now
}
