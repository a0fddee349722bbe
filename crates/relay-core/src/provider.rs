//! Provider identifiers.

use serde::{Deserialize, Serialize};

/// Upstream providers the relay can speak to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Zhipu AI (bigmodel.cn). Requires a freshly signed token per call.
    Zhipu,
    /// DeepSeek. Static bearer key; exposes a separate reasoning channel.
    DeepSeek,
}

impl ProviderKind {
    /// Human-readable provider name, used in user-facing error messages.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Zhipu => "Zhipu",
            Self::DeepSeek => "DeepSeek",
        }
    }

    /// How the stored secret is turned into an authorization artifact.
    #[must_use]
    pub fn auth_scheme(&self) -> AuthScheme {
        match self {
            Self::Zhipu => AuthScheme::SignedToken,
            Self::DeepSeek => AuthScheme::StaticKey,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = crate::error::RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zhipu" => Ok(Self::Zhipu),
            "deepseek" => Ok(Self::DeepSeek),
            other => Err(crate::error::RelayError::internal(format!(
                "Unknown provider: {other}"
            ))),
        }
    }
}

/// Authorization scheme a provider requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// The stored secret is sent verbatim as a bearer key.
    StaticKey,
    /// A time-bounded token is signed from the stored secret per call.
    SignedToken,
}
