//! Byte-stream relay of the backend chat response.
//!
//! Converts a channel of RelayEvents into the HTTP response body stream.
//! Chunks pass through untouched and in order; a terminal failure is encoded
//! as an in-band JSON sentinel chunk, since the response status line and
//! headers are already committed once streaming begins.

use std::convert::Infallible;

use bytes::Bytes;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::ollama::RelayEvent;

/// Sentinel error chunk: a client must treat this as stream termination
/// with failure, distinct from normal partial-result chunks.
#[derive(Debug, Serialize)]
struct ErrorChunk<'a> {
    error: &'a str,
}

/// Convert a relay event receiver into an HTTP body stream.
///
/// `Failed` needs no explicit stream termination here: the producer drops its
/// sender right after sending it, which closes the channel and ends the stream.
pub fn relay_to_body_stream(
    rx: mpsc::Receiver<RelayEvent>,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    ReceiverStream::new(rx).map(|event| match event {
        RelayEvent::Chunk(bytes) => Ok(bytes),
        RelayEvent::Failed(reason) => Ok(error_chunk(&reason)),
    })
}

/// Encode a failure as a newline-terminated JSON object with an `error` key.
fn error_chunk(reason: &str) -> Bytes {
    let mut payload = serde_json::to_vec(&ErrorChunk { error: reason }).unwrap_or_default();
    payload.push(b'\n');
    Bytes::from(payload)
}
