//! In-memory capability provider for tests.
//!
//! `FakeCapability` serves a fixed list of [`FakeModel`]s and counts how
//! often it was queried, so tests can assert that validation failures never
//! reach the provider. Each `FakeModel` records the turn sequences it was
//! sent and replays a scripted fragment sequence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{ChatTurn, ModelInfo, ModelSelectRequest};
use crate::ports::{CapabilityError, ChatCapabilityPort, ChatModelPort, FragmentStream};

/// Scripted chat model. Clones share their request log.
#[derive(Debug, Clone)]
pub struct FakeModel {
    info: ModelInfo,
    script: Vec<Result<String, CapabilityError>>,
    send_error: Option<CapabilityError>,
    requests: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
}

impl FakeModel {
    /// A model named after its id that replies with nothing.
    pub fn new(id: &str, vendor: &str, family: &str) -> Self {
        Self {
            info: ModelInfo::new(id, id, vendor, family),
            script: Vec::new(),
            send_error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the display name.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.info.name = name.to_string();
        self
    }

    /// Reply with these fragments, in order.
    #[must_use]
    pub fn with_fragments<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script = fragments.into_iter().map(|f| Ok(f.into())).collect();
        self
    }

    /// Reply with an arbitrary sequence of fragments and stream errors.
    #[must_use]
    pub fn with_script(mut self, script: Vec<Result<String, CapabilityError>>) -> Self {
        self.script = script;
        self
    }

    /// Fail `send_request` before any fragment is produced.
    #[must_use]
    pub fn failing_with(mut self, err: CapabilityError) -> Self {
        self.send_error = Some(err);
        self
    }

    /// Every turn sequence sent to this model so far.
    pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModelPort for FakeModel {
    fn info(&self) -> ModelInfo {
        self.info.clone()
    }

    async fn send_request(
        &self,
        turns: Vec<ChatTurn>,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, CapabilityError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(turns);
        }
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        Ok(FragmentStream::from_results(self.script.clone()).with_cancellation(cancel))
    }
}

/// Scripted capability provider.
#[derive(Debug, Default)]
pub struct FakeCapability {
    models: Vec<FakeModel>,
    select_error: Option<CapabilityError>,
    select_calls: AtomicUsize,
}

impl FakeCapability {
    /// A provider with no models installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model; models are reported in insertion order.
    #[must_use]
    pub fn with_model(mut self, model: FakeModel) -> Self {
        self.models.push(model);
        self
    }

    /// Fail every selection with `err`.
    #[must_use]
    pub fn failing_with(mut self, err: CapabilityError) -> Self {
        self.select_error = Some(err);
        self
    }

    /// Number of times the provider was queried.
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCapabilityPort for FakeCapability {
    async fn select_chat_models(
        &self,
        criteria: &ModelSelectRequest,
    ) -> Result<Vec<Arc<dyn ChatModelPort>>, CapabilityError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.select_error {
            return Err(err.clone());
        }
        Ok(self
            .models
            .iter()
            .filter(|m| criteria.matches(&m.info))
            .map(|m| Arc::new(m.clone()) as Arc<dyn ChatModelPort>)
            .collect())
    }
}
