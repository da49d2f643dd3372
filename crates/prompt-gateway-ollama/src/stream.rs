//! NDJSON chunk decoding for streamed `/api/chat` replies.
//!
//! Ollama streams one JSON object per line. Lines can be split across
//! transport frames, so bytes are buffered until a newline arrives.

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tracing::warn;

use prompt_gateway_core::{BackendError, ChatChunk, ChunkStream};

/// State threaded through the `unfold` stream.
struct NdjsonState<S> {
    stream: S,
    buf: BytesMut,
    finished: bool,
}

/// Decode an NDJSON byte stream into chat chunks.
///
/// The stream ends after a chunk with `done: true`, after the first error,
/// or when the body closes. A trailing line without a newline is still decoded.
pub(crate) fn ndjson_chunks<S, E>(byte_stream: S, classify: fn(E) -> BackendError) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = NdjsonState {
        stream: byte_stream.boxed(),
        buf: BytesMut::new(),
        finished: false,
    };

    futures_util::stream::unfold(state, move |mut st| async move {
        if st.finished {
            return None;
        }

        loop {
            if let Some(line_end) = find_newline(&st.buf) {
                let line = st.buf.split_to(line_end + 1);
                match decode_line(&line) {
                    None => continue,
                    Some(item) => {
                        st.finished = is_terminal(&item);
                        return Some((item, st));
                    }
                }
            }

            match st.stream.next().await {
                Some(Ok(frame)) => st.buf.extend_from_slice(&frame),
                Some(Err(e)) => {
                    let err = classify(e);
                    warn!("Ollama stream error: {err}");
                    st.finished = true;
                    return Some((Err(err), st));
                }
                None => {
                    st.finished = true;
                    let rest = st.buf.split();
                    return decode_line(&rest).map(|item| (item, st));
                }
            }
        }
    })
    .boxed()
}

fn is_terminal(item: &Result<ChatChunk, BackendError>) -> bool {
    match item {
        Ok(chunk) => chunk.done || chunk.error.is_some(),
        Err(_) => true,
    }
}

/// Decode one line. Blank lines yield `None`.
fn decode_line(line: &[u8]) -> Option<Result<ChatChunk, BackendError>> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(serde_json::from_str::<ChatChunk>(trimmed).map_err(|e| {
        BackendError::Runtime(format!("Invalid stream chunk from Ollama: {e}"))
    }))
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}
