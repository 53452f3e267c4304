//! Fragment stream to SSE bridge.
//!
//! Every model fragment becomes one `data: {"fragment": ...}` event. The
//! stream always ends with exactly one terminal event: `{"done": true}` on
//! normal completion or `{"error": ...}` on failure. Model selection runs
//! lazily inside the stream, so a selection failure after the headers are
//! sent is still reported as an error event.
//!
//! The stream owns a drop guard for the request's cancellation token: when
//! the client disconnects and the body is dropped, the model request is
//! cancelled.

use std::convert::Infallible;

use axum::http::{HeaderValue, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, Stream, StreamExt, stream};
use lmgate_core::{CapabilityError, FragmentStream};
use serde::Serialize;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// One SSE event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Fragment { fragment: String },
    Done { done: bool },
    Error { error: String },
}

impl StreamEvent {
    pub fn fragment(text: impl Into<String>) -> Self {
        Self::Fragment {
            fragment: text.into(),
        }
    }

    pub const fn done() -> Self {
        Self::Done { done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Encode as an SSE `data:` event.
    pub fn to_event(&self) -> Event {
        Event::default().json_data(self).unwrap_or_else(|e| {
            warn!("Failed to encode stream event: {e}");
            Event::default().data(r#"{"error":"Failed to encode stream event"}"#)
        })
    }
}

enum Phase {
    Starting(BoxFuture<'static, Result<FragmentStream, CapabilityError>>),
    Streaming(FragmentStream),
    Finished,
}

struct Bridge {
    phase: Phase,
    forwarded: usize,
    _cancel_on_drop: DropGuard,
}

impl Bridge {
    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Starting(start) => match start.await {
                    Ok(fragments) => self.phase = Phase::Streaming(fragments),
                    Err(err) => return Some(self.fail(&err)),
                },
                Phase::Streaming(mut fragments) => {
                    return match fragments.next().await {
                        Some(Ok(text)) => {
                            self.forwarded += 1;
                            self.phase = Phase::Streaming(fragments);
                            Some(StreamEvent::fragment(text))
                        }
                        Some(Err(err)) => Some(self.fail(&err)),
                        None => {
                            debug!(fragments = self.forwarded, "Chat stream complete");
                            Some(StreamEvent::done())
                        }
                    };
                }
                Phase::Finished => return None,
            }
        }
    }

    fn fail(&self, err: &CapabilityError) -> StreamEvent {
        warn!(fragments = self.forwarded, "Error in chat stream: {err}");
        StreamEvent::error(err.to_string())
    }
}

/// Build the event stream for a chat request.
///
/// `start` resolves to the model's fragment stream; it is not polled until
/// the first event is requested. `cancel` is cancelled when the returned
/// stream is dropped.
pub fn chat_events<F>(
    start: F,
    cancel: CancellationToken,
) -> impl Stream<Item = StreamEvent> + Send + 'static
where
    F: Future<Output = Result<FragmentStream, CapabilityError>> + Send + 'static,
{
    let bridge = Bridge {
        phase: Phase::Starting(start.boxed()),
        forwarded: 0,
        _cancel_on_drop: cancel.drop_guard(),
    };

    stream::unfold(bridge, |mut bridge| async move {
        let event = bridge.next_event().await?;
        Some((event, bridge))
    })
}

/// Wrap an event stream in an SSE response.
pub fn sse_response<S>(events: S) -> Response
where
    S: Stream<Item = StreamEvent> + Send + 'static,
{
    let body = events.map(|event| Ok::<_, Infallible>(event.to_event()));
    let mut response = Sse::new(body).into_response();

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    response
}
