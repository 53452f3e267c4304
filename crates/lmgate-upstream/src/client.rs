//! Capability adapter backed by an OpenAI-compatible HTTP server.
//!
//! Any server exposing `/v1/models` and streaming `/v1/chat/completions`
//! (llama-server, vLLM, Ollama's OpenAI layer, hosted APIs) can act as the
//! capability provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lmgate_core::{
    CapabilityError, ChatCapabilityPort, ChatModelPort, ChatTurn, FragmentStream, ModelInfo,
    ModelSelectRequest,
};
use reqwest::{Client, RequestBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::models::{ChatCompletionRequest, ModelList, WireMessage};
use crate::sse::sse_fragments;

/// Vendor reported for models whose upstream entry has no `owned_by`.
pub const DEFAULT_VENDOR: &str = "openai-compatible";

/// Errors building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream URL must start with http:// or https://, got {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the upstream server.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL without the `/v1` suffix, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Vendor name for models that do not report one.
    pub default_vendor: String,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            default_vendor: DEFAULT_VENDOR.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_default_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.default_vendor = vendor.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Shared connection state for the provider and the models it hands out.
#[derive(Debug)]
struct Upstream {
    client: Client,
    config: UpstreamConfig,
}

impl Upstream {
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// [`ChatCapabilityPort`] implementation for OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiCompatCapability {
    upstream: Arc<Upstream>,
}

impl OpenAiCompatCapability {
    /// Build the adapter.
    ///
    /// No request timeout is set: generation may legitimately run for a long
    /// time and is bounded by client cancellation instead.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(UpstreamError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            upstream: Arc::new(Upstream { client, config }),
        })
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>, CapabilityError> {
        let url = self.upstream.config.endpoint("/v1/models");
        debug!("GET {url}");

        let response = self
            .upstream
            .authorize(self.upstream.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach upstream: {e}");
                CapabilityError::Provider(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Provider(format!(
                "upstream returned {status}: {body}"
            )));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| CapabilityError::Provider(format!("invalid model list: {e}")))?;

        let default_vendor = &self.upstream.config.default_vendor;
        Ok(list
            .data
            .into_iter()
            .map(|entry| {
                let vendor = entry
                    .owned_by
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| default_vendor.clone());
                ModelInfo::new(entry.id.clone(), entry.id.clone(), vendor, entry.id)
            })
            .collect())
    }
}

#[async_trait]
impl ChatCapabilityPort for OpenAiCompatCapability {
    async fn select_chat_models(
        &self,
        criteria: &ModelSelectRequest,
    ) -> Result<Vec<Arc<dyn ChatModelPort>>, CapabilityError> {
        let models = self.fetch_models().await?;
        Ok(models
            .into_iter()
            .filter(|info| criteria.matches(info))
            .map(|info| {
                Arc::new(UpstreamModel {
                    info,
                    upstream: Arc::clone(&self.upstream),
                }) as Arc<dyn ChatModelPort>
            })
            .collect())
    }
}

/// A model served by the upstream.
#[derive(Debug)]
struct UpstreamModel {
    info: ModelInfo,
    upstream: Arc<Upstream>,
}

#[async_trait]
impl ChatModelPort for UpstreamModel {
    fn info(&self) -> ModelInfo {
        self.info.clone()
    }

    async fn send_request(
        &self,
        turns: Vec<ChatTurn>,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, CapabilityError> {
        let url = self.upstream.config.endpoint("/v1/chat/completions");
        let body = ChatCompletionRequest {
            model: &self.info.id,
            messages: turns.iter().map(WireMessage::from).collect(),
            stream: true,
        };

        debug!(model = %self.info.id, turns = turns.len(), "POST {url}");

        let request = self
            .upstream
            .authorize(self.upstream.client.post(&url))
            .json(&body)
            .send();

        let response = until_cancelled(request, &cancel).await?.map_err(|e| {
            error!("Failed to connect to upstream: {e}");
            CapabilityError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::RequestFailed(format!(
                "upstream returned {status}: {body}"
            )));
        }

        Ok(FragmentStream::new(sse_fragments(response.bytes_stream())).with_cancellation(cancel))
    }
}

/// Await `fut` unless `cancel` fires first.
async fn until_cancelled<F, T>(fut: F, cancel: &CancellationToken) -> Result<T, CapabilityError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CapabilityError::Cancelled),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let err = OpenAiCompatCapability::new(UpstreamConfig::new("localhost:8080")).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidUrl(_)));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = UpstreamConfig::new("http://127.0.0.1:8080/");
        assert_eq!(
            config.endpoint("/v1/models"),
            "http://127.0.0.1:8080/v1/models"
        );
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let config = UpstreamConfig::new("http://x").with_api_key(Some("  ".into()));
        assert!(config.api_key.is_none());
    }
}
