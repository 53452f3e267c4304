//! Chat capability port.
//!
//! The capability provider is the external component that knows which chat
//! models exist and how to run them. The gateway only ever talks to it
//! through these two traits, so a host integration, an HTTP upstream or a
//! test fake can be swapped in at the composition root.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{ChatTurn, ModelInfo, ModelSelectRequest};

/// Errors reported by the capability provider or the client built on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// No model satisfies the selection criteria.
    ///
    /// This is a configuration problem, not a transient one: callers should
    /// surface it rather than retry.
    #[error(
        "No language model found. Please make sure a chat model provider is installed and enabled."
    )]
    NoModelAvailable,

    /// The provider rejected or failed the request before streaming began.
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    /// The fragment stream failed after it had started.
    #[error("Stream failed: {0}")]
    Stream(String),

    /// The request was cancelled through its cancellation token.
    #[error("Request was cancelled")]
    Cancelled,

    /// Provider transport or protocol error.
    #[error("Capability provider error: {0}")]
    Provider(String),
}

/// Forward-only stream of generated text fragments.
///
/// Single-pass: it is not `Clone` and every consuming operation takes it by
/// value.
pub struct FragmentStream {
    inner: Pin<Box<dyn Stream<Item = Result<String, CapabilityError>> + Send>>,
}

impl FragmentStream {
    /// Wrap any fragment stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String, CapabilityError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Build a stream from already-known items.
    pub fn from_results<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<String, CapabilityError>>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(items))
    }

    /// Stop yielding fragments once `cancel` fires.
    #[must_use]
    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self::new(self.take_until(cancel.cancelled_owned()))
    }

    /// Drain the stream and concatenate fragments in arrival order.
    ///
    /// The first error aborts collection and is returned.
    pub async fn collect_text(mut self) -> Result<String, CapabilityError> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String, CapabilityError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentStream").finish_non_exhaustive()
    }
}

/// A selected chat model.
#[async_trait]
pub trait ChatModelPort: Send + Sync + fmt::Debug {
    /// Identity of this model.
    fn info(&self) -> ModelInfo;

    /// Submit an ordered turn sequence and stream back the reply.
    ///
    /// `cancel` is best-effort: once it fires the provider should stop
    /// producing fragments.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` if the request cannot be started. Failures
    /// after streaming began are reported as items of the stream.
    async fn send_request(
        &self,
        turns: Vec<ChatTurn>,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, CapabilityError>;
}

/// Port for enumerating chat models.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCapabilityPort: Send + Sync + fmt::Debug {
    /// Return every model matching `criteria`, in provider order.
    ///
    /// An empty result is not an error.
    async fn select_chat_models(
        &self,
        criteria: &ModelSelectRequest,
    ) -> Result<Vec<Arc<dyn ChatModelPort>>, CapabilityError>;
}
