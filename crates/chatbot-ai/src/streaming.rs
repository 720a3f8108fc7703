//! Server-Sent Events (SSE) streaming parser.
//!
//! Gemini streams `streamGenerateContent?alt=sse` responses as SSE. The
//! decoder here is transport-agnostic; [`sse_events`] wires it to a reqwest
//! body as a lazy stream, so dropping the stream drops the response and
//! closes the connection.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, if the server named one.
    pub event: Option<String>,
    /// The event data (JSON string for Gemini).
    pub data: String,
}

/// Incremental line-oriented SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    current_event: Option<String>,
    current_data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator). Returns an event when the
    /// line completes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            // Empty line = end of event
            let event = self.current_event.take();
            if self.current_data.is_empty() {
                return None;
            }
            return Some(SseEvent {
                event,
                data: std::mem::take(&mut self.current_data),
            });
        }

        if line.starts_with(':') {
            return None;
        }

        if let Some(event_type) = field_value(line, "event") {
            self.current_event = Some(event_type.to_string());
        } else if let Some(data) = field_value(line, "data") {
            if !self.current_data.is_empty() {
                self.current_data.push('\n');
            }
            self.current_data.push_str(data);
        }
        // id: and retry: are not used
        None
    }

    /// Flush a trailing event that was not followed by a blank line.
    pub fn finish(self) -> Option<SseEvent> {
        if self.current_data.is_empty() {
            None
        } else {
            Some(SseEvent {
                event: self.current_event,
                data: self.current_data,
            })
        }
    }
}

fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode a reqwest response body into a stream of SSE events.
pub fn sse_events(response: reqwest::Response) -> BoxStream<'static, Result<SseEvent, AiError>> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));

    Box::pin(async_stream::try_stream! {
        let mut lines = reader.lines();
        let mut decoder = SseDecoder::new();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?
        {
            if let Some(event) = decoder.push_line(&line) {
                yield event;
            }
        }

        if let Some(event) = decoder.finish() {
            yield event;
        }
    })
}
