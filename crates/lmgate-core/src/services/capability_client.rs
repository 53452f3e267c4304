//! Capability client - drives model selection and chat exchanges.
//!
//! The client holds no state between calls: every operation selects a model
//! afresh and hands back plain data.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{ChatMessage, DEFAULT_SYSTEM_PROMPT, ModelInfo, ModelSelectRequest, build_turns};
use crate::ports::{CapabilityError, ChatCapabilityPort, ChatModelPort, FragmentStream};

/// Service wrapping a [`ChatCapabilityPort`].
#[derive(Clone)]
pub struct CapabilityClient {
    port: Arc<dyn ChatCapabilityPort>,
    system_prompt: Arc<str>,
}

impl CapabilityClient {
    /// Create a client with the default system preamble.
    pub fn new(port: Arc<dyn ChatCapabilityPort>) -> Self {
        Self::with_system_prompt(port, DEFAULT_SYSTEM_PROMPT)
    }

    /// Create a client with a custom system preamble.
    pub fn with_system_prompt(port: Arc<dyn ChatCapabilityPort>, system_prompt: &str) -> Self {
        Self {
            port,
            system_prompt: Arc::from(system_prompt),
        }
    }

    /// The preamble sent ahead of every conversation.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Select the first model matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError::NoModelAvailable` if nothing matches.
    pub async fn select_model(
        &self,
        criteria: &ModelSelectRequest,
    ) -> Result<(Arc<dyn ChatModelPort>, ModelInfo), CapabilityError> {
        let model = self
            .port
            .select_chat_models(criteria)
            .await?
            .into_iter()
            .next()
            .ok_or(CapabilityError::NoModelAvailable)?;

        let info = model.info();
        debug!(
            model_id = %info.id,
            vendor = %info.vendor,
            family = %info.family,
            "Selected chat model"
        );
        Ok((model, info))
    }

    /// List every available model in provider order.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, CapabilityError> {
        let models = self
            .port
            .select_chat_models(&ModelSelectRequest::any())
            .await?;
        Ok(models.iter().map(|m| m.info()).collect())
    }

    /// Start a conversation and return the model's fragment stream as-is.
    ///
    /// The stream may only be consumed once.
    pub async fn converse(
        &self,
        message: &str,
        history: &[ChatMessage],
        criteria: &ModelSelectRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, CapabilityError> {
        let (model, info) = self.select_model(criteria).await?;
        let turns = build_turns(&self.system_prompt, history, message);

        info!(
            model_id = %info.id,
            history_len = history.len(),
            "Submitting chat request"
        );

        model.send_request(turns, cancel).await
    }

    /// Run a conversation to completion and return the full reply.
    pub async fn converse_complete(
        &self,
        message: &str,
        history: &[ChatMessage],
        criteria: &ModelSelectRequest,
    ) -> Result<String, CapabilityError> {
        let stream = self
            .converse(message, history, criteria, CancellationToken::new())
            .await?;
        let text = stream.collect_text().await?;
        debug!(response_len = text.len(), "Chat response complete");
        Ok(text)
    }
}

impl fmt::Debug for CapabilityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityClient")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
