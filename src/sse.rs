//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! Groq streams chat completions the OpenAI way: every event is a `data:` line
//! holding one JSON chunk, and the literal `data: [DONE]` ends the stream.
//! This module turns the raw byte stream into a stream of parsed
//! [`ChatCompletionChunk`] values.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::{ChatCompletionChunk, Error, Result};

const DONE_MARKER: &str = "[DONE]";

/// What one complete SSE frame amounts to.
#[derive(Debug)]
enum Frame {
    Chunk(Result<ChatCompletionChunk>),
    Done,
    Skip,
}

/// Process a stream of bytes into a stream of completion chunks.
///
/// The returned stream yields one item per `data:` frame, stops at the
/// `[DONE]` marker, and surfaces transport, encoding, and parse failures as
/// `Err` items.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let state = SseState {
        buffer: String::new(),
        pending: Vec::new(),
        finished: false,
    };

    stream::unfold((stream, state), move |(mut stream, mut state)| async move {
        if state.finished {
            return None;
        }
        loop {
            // First check if we have a complete frame in the buffer
            if let Some((frame, remaining)) = extract_frame(&state.buffer) {
                state.buffer = remaining;
                match frame {
                    Frame::Chunk(chunk) => {
                        count(&chunk);
                        return Some((chunk, (stream, state)));
                    }
                    Frame::Done => return None,
                    Frame::Skip => continue,
                }
            }

            // Read more data
            match stream.next().await {
                Some(Ok(bytes)) => {
                    STREAM_BYTES.count(bytes.len() as u64);
                    if let Err(e) = state.push(&bytes) {
                        STREAM_ERRORS.click();
                        state.finished = true;
                        return Some((Err(e), (stream, state)));
                    }
                }
                Some(Err(e)) => {
                    STREAM_ERRORS.click();
                    state.finished = true;
                    return Some((Err(e), (stream, state)));
                }
                None => {
                    state.finished = true;
                    // A final frame may arrive without its blank-line terminator.
                    if state.buffer.trim().is_empty() {
                        return None;
                    }
                    state.buffer.push_str("\n\n");
                    while let Some((frame, remaining)) = extract_frame(&state.buffer) {
                        state.buffer = remaining;
                        match frame {
                            Frame::Chunk(chunk) => {
                                count(&chunk);
                                return Some((chunk, (stream, state)));
                            }
                            Frame::Done => return None,
                            Frame::Skip => {}
                        }
                    }
                    return None;
                }
            }
        }
    })
}

/// Decoding state carried between polls of the byte stream.
struct SseState {
    /// Decoded text not yet consumed as a frame.
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across network reads.
    pending: Vec<u8>,
    finished: bool,
}

impl SseState {
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(Error::encoding(
                    format!("Invalid UTF-8 in stream: {e}"),
                    Some(Box::new(e)),
                ));
            }
        };
        let rest = self.pending.split_off(valid_up_to);
        let text = String::from_utf8(std::mem::replace(&mut self.pending, rest))
            .map_err(|e| Error::encoding(format!("Invalid UTF-8 in stream: {e}"), Some(Box::new(e))))?;
        self.buffer.push_str(&text);
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }
        Ok(())
    }
}

fn count(chunk: &Result<ChatCompletionChunk>) {
    if chunk.is_ok() {
        STREAM_CHUNKS.click();
    } else {
        STREAM_ERRORS.click();
    }
}

/// Extract a complete SSE frame from a buffer string.
///
/// Frames are delimited by a blank line.  Comment lines (leading `:`) and
/// fields other than `event:` and `data:` are ignored; multiple `data:` lines
/// are joined with newlines.
fn extract_frame(buffer: &str) -> Option<(Frame, String)> {
    let (frame_text, rest) = buffer.split_once("\n\n")?;
    let rest = rest.to_string();

    let mut event_type = None;
    let mut data: Option<String> = None;
    for line in frame_text.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
    }

    let Some(data) = data else {
        return Some((Frame::Skip, rest));
    };
    let data = data.trim();
    if data == DONE_MARKER {
        return Some((Frame::Done, rest));
    }
    if event_type == Some("error") {
        return Some((Frame::Chunk(Err(stream_error(data))), rest));
    }
    Some((Frame::Chunk(parse_chunk(data)), rest))
}

#[derive(Deserialize)]
struct StreamErrorEnvelope {
    error: StreamErrorDetail,
}

#[derive(Deserialize)]
struct StreamErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

fn parse_chunk(data: &str) -> Result<ChatCompletionChunk> {
    if let Ok(envelope) = serde_json::from_str::<StreamErrorEnvelope>(data) {
        return Err(envelope_error(envelope, data));
    }
    serde_json::from_str::<ChatCompletionChunk>(data).map_err(|e| {
        Error::serialization(
            format!("Failed to parse stream chunk: {e}"),
            Some(Box::new(e)),
        )
    })
}

fn stream_error(data: &str) -> Error {
    match serde_json::from_str::<StreamErrorEnvelope>(data) {
        Ok(envelope) => envelope_error(envelope, data),
        Err(_) => Error::api(500, Some("stream_error".to_string()), data.to_string(), None),
    }
}

fn envelope_error(envelope: StreamErrorEnvelope, data: &str) -> Error {
    Error::api(
        500,
        envelope
            .error
            .error_type
            .or_else(|| Some("stream_error".to_string())),
        envelope.error.message.unwrap_or_else(|| data.to_string()),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static
    {
        stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(chunks: Vec<&'static [u8]>) -> Vec<Result<ChatCompletionChunk>> {
        process_sse(bytes_stream(chunks)).collect().await
    }

    #[tokio::test]
    async fn parse_text_chunks_until_done() {
        let events = collect(vec![
            b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
            b"data: [DONE]\n\n",
        ])
        .await;

        let texts: Vec<_> = events
            .iter()
            .map(|e| e.as_ref().unwrap().text().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn nothing_after_done_is_read() {
        let events = collect(vec![
            b"data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ])
        .await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn handle_split_frame() {
        let events = collect(vec![
            b"data: {\"choices\":[{\"delta\":",
            b"{\"content\":\"joined\"}}]}\n",
            b"\ndata: [DONE]\n\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), Some("joined"));
    }

    #[tokio::test]
    async fn crlf_delimiters_and_comments() {
        let events = collect(vec![
            b": keep-alive\r\n\r\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\r\n\r\n",
            b"data: [DONE]\r\n\r\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), Some("ok"));
    }

    #[tokio::test]
    async fn trailing_frame_without_terminator() {
        let events = collect(vec![b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), Some("tail"));
    }

    #[tokio::test]
    async fn handle_malformed_chunk() {
        let events = collect(vec![b"data: not json\n\n"]).await;
        assert_eq!(events.len(), 1);
        let err = events[0].as_ref().unwrap_err();
        assert!(err.is_serialization());
    }

    #[tokio::test]
    async fn error_payload_becomes_api_error() {
        let events = collect(vec![
            b"data: {\"error\":{\"message\":\"over capacity\",\"type\":\"server_error\"}}\n\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        let err = events[0].as_ref().unwrap_err();
        assert_eq!(err.to_string(), "server_error: over capacity");
    }

    #[tokio::test]
    async fn error_event_type_becomes_api_error() {
        let events = collect(vec![b"event: error\ndata: upstream went away\n\n"]).await;
        assert_eq!(events.len(), 1);
        let err = events[0].as_ref().unwrap_err();
        assert_eq!(err.to_string(), "stream_error: upstream went away");
    }

    #[tokio::test]
    async fn utf8_split_across_reads() {
        // "olá" with the two bytes of 'á' in separate reads.
        let events = collect(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ol\xc3",
            b"\xa1\"}}]}\n\n",
        ])
        .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), Some("olá"));
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_encoding_error() {
        let events = collect(vec![b"data: \xff\xfe\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(Error::Encoding { .. })));
    }
}
