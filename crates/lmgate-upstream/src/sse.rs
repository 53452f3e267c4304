//! SSE decoding for upstream streaming responses.
//!
//! OpenAI-compatible servers stream `data: {chunk}\n\n` lines terminated by
//! `data: [DONE]`. This module turns that byte stream into text fragments.

use std::fmt::Display;

use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use lmgate_core::CapabilityError;
use tracing::{debug, warn};

use crate::models::ChatCompletionChunk;

/// Reported when the upstream closes without its `[DONE]` terminator.
const MISSING_DONE: &str = "upstream closed the stream before [DONE]";

/// State threaded through the `unfold` stream.
struct DecoderState<E> {
    stream: BoxStream<'static, Result<Bytes, E>>,
    buf: BytesMut,
    eof: bool,
    done: bool,
}

/// Outcome of decoding one SSE line.
enum Line {
    Fragment(String),
    Skip,
    Done,
    Failed(String),
}

/// Convert an upstream SSE byte stream into text fragments.
///
/// Chunk boundaries may fall anywhere, including inside a line. A trailing
/// line without a newline is still decoded when the upstream closes. A close
/// without `[DONE]` is a truncated generation and ends with an error.
pub fn sse_fragments<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<String, CapabilityError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecoderState {
        stream: byte_stream.boxed(),
        buf: BytesMut::new(),
        eof: false,
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }

        loop {
            if let Some(line_end) = find_newline(&st.buf) {
                let line = st.buf.split_to(line_end + 1);
                match decode_line(&String::from_utf8_lossy(&line)) {
                    Line::Fragment(text) => return Some((Ok(text), st)),
                    Line::Skip => continue,
                    Line::Done => return None,
                    Line::Failed(message) => {
                        st.done = true;
                        return Some((Err(CapabilityError::Stream(message)), st));
                    }
                }
            }

            if st.eof {
                warn!("Upstream closed the stream before [DONE]");
                st.done = true;
                return Some((Err(CapabilityError::Stream(MISSING_DONE.into())), st));
            }

            match st.stream.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    warn!("Upstream stream error: {e}");
                    st.done = true;
                    return Some((Err(CapabilityError::Stream(e.to_string())), st));
                }
                None => {
                    // Flush a final unterminated line.
                    st.eof = true;
                    if !st.buf.is_empty() {
                        st.buf.extend_from_slice(b"\n");
                    }
                }
            }
        }
    })
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

fn decode_line(raw: &str) -> Line {
    let line = raw.trim();

    // Blank separators, SSE comments and non-data fields carry no text.
    let Some(data) = line.strip_prefix("data:") else {
        return Line::Skip;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Line::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => {
            if let Some(err) = chunk.error {
                return Line::Failed(err.message);
            }
            chunk
                .content()
                .map_or(Line::Skip, |text| Line::Fragment(text.to_string()))
        }
        Err(e) => {
            debug!("Skipping unparseable SSE payload: {e}");
            Line::Skip
        }
    }
}
