//! # Relay Gateway
//!
//! Orchestration for one streaming chat call: resolve the credential,
//! build the provider body, issue the upstream HTTPS call, translate
//! pre-flight failures, and drive the stream transcoder.
//!
//! Failures at or before the upstream call return a structured error with
//! no output bytes. Once streaming begins, failures surface through the
//! chunk stream instead. The gateway performs no retries, caches no
//! inference results, and enforces no timeout; callers impose deadlines
//! externally, and dropping the returned stream releases the upstream
//! connection.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use futures::stream::BoxStream;
use relay_auth::CredentialResolver;
use relay_core::{ChatRequest, OutputChunk, ProviderKind, RelayError, RelayResult};
use relay_providers::{
    transcode, translate, DeepSeekAdapter, ProviderAdapter, ZhipuAdapter,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The streaming inference gateway.
///
/// One instance serves many concurrent calls; the only cross-call mutable
/// state is the lock-guarded signed-token cache inside the resolver.
pub struct ChatGateway {
    client: Client,
    resolver: CredentialResolver,
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ChatGateway {
    /// Create a gateway with default adapters for all providers.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> RelayResult<Self> {
        Self::builder().build()
    }

    /// Create a new builder for `ChatGateway`.
    #[must_use]
    pub fn builder() -> ChatGatewayBuilder {
        ChatGatewayBuilder::default()
    }

    /// Issue one streaming chat call.
    ///
    /// On success, returns the lazy, single-pass chunk stream; the caller
    /// consumes it exactly once. On failure before any output, returns the
    /// translated error directly.
    ///
    /// # Errors
    /// Returns a pre-flight [`RelayError`] for credential, serialization,
    /// connection, or upstream HTTP-status failures.
    pub async fn stream_chat(
        &self,
        provider: ProviderKind,
        secret: &str,
        request: &ChatRequest,
    ) -> RelayResult<BoxStream<'static, Result<OutputChunk, RelayError>>> {
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| RelayError::internal(format!("No adapter registered for {provider}")))?;

        let credential = self.resolver.resolve(provider, secret)?;
        let body = adapter.request_body(request)?;
        let endpoint = adapter.endpoint();

        debug!(%provider, model = %request.settings.model_id, %endpoint, "Issuing upstream streaming call");

        let response = self
            .client
            .post(&endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", credential.bearer_value()))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::connection_failed(provider, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.map_err(|e| {
                RelayError::malformed_response(provider, format!("Failed to read error body: {e}"))
            })?;
            return Err(translate::upstream_error(provider, status.as_u16(), &body_text));
        }

        debug!(%provider, "Upstream stream opened");
        Ok(transcode(provider, adapter.decoder(), response.bytes_stream()))
    }
}

impl std::fmt::Debug for ChatGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGateway")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ChatGateway`].
#[derive(Default)]
pub struct ChatGatewayBuilder {
    client: Option<Client>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ChatGatewayBuilder {
    /// Use a pre-built HTTP client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Register or replace an adapter (keyed by its provider kind).
    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Build the gateway. Providers without a registered adapter get the
    /// default production adapter.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn build(self) -> RelayResult<ChatGateway> {
        let client = match self.client {
            Some(client) => client,
            // No request timeout: deadlines are the caller's concern.
            None => Client::builder()
                .pool_max_idle_per_host(100)
                .build()
                .map_err(|e| RelayError::internal(format!("Failed to create HTTP client: {e}")))?,
        };

        let mut adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>> = HashMap::new();
        adapters.insert(ProviderKind::Zhipu, Arc::new(ZhipuAdapter::new()));
        adapters.insert(ProviderKind::DeepSeek, Arc::new(DeepSeekAdapter::new()));
        for adapter in self.adapters {
            adapters.insert(adapter.kind(), adapter);
        }

        Ok(ChatGateway {
            client,
            resolver: CredentialResolver::new(),
            adapters,
        })
    }
}
