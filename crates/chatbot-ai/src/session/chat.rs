//! Running a turn: incremental and batch.

use chatbot_common::new_correlation_id;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::{AiError, Message, StreamEvent};

use super::manager::ChatEngine;

/// Reply fragments in arrival order.
///
/// The turn is complete when the stream ends; the assistant turn is stored
/// at that point. Dropping the stream early abandons the turn, leaving only
/// the user turn in history. A reply with no text ends the stream with an
/// error and is not stored.
pub type ReplyStream = BoxStream<'static, Result<String, AiError>>;

impl ChatEngine {
    /// Start a turn and stream the reply.
    ///
    /// Waits for any turn already in flight on `thread_id`. A `None` or blank
    /// `language` reuses the thread's remembered language.
    pub async fn chat_stream(
        &self,
        thread_id: &str,
        message: &str,
        language: Option<&str>,
    ) -> Result<ReplyStream, AiError> {
        let turn = self.locks.acquire(thread_id).await;
        let prompt = self.prepare(thread_id, message, language).await;

        let request_id = new_correlation_id();
        info!(
            thread_id,
            request_id = %request_id,
            model = self.model_name(),
            turns = prompt.len(),
            "invoking model"
        );

        let mut upstream = self.client.stream_message(&prompt).await.map_err(|err| {
            warn!(thread_id, request_id = %request_id, error = %err, "model invocation failed");
            err
        })?;

        let store = self.store.clone();
        let thread_id = thread_id.to_string();

        Ok(Box::pin(async_stream::try_stream! {
            let _turn = turn;
            let mut reply = String::new();

            while let Some(event) = upstream.next().await {
                let event = event.map_err(|err| {
                    warn!(thread_id = %thread_id, request_id = %request_id, error = %err, "reply stream failed");
                    err
                })?;
                match event {
                    StreamEvent::Delta(text) => {
                        reply.push_str(&text);
                        yield text;
                    }
                    StreamEvent::Usage(usage) => {
                        debug!(
                            request_id = %request_id,
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "token usage"
                        );
                    }
                }
            }

            if reply.trim().is_empty() {
                warn!(thread_id = %thread_id, request_id = %request_id, "model returned an empty reply");
                Err::<(), _>(AiError::ApiError("model returned an empty reply".into()))?;
            }

            info!(
                thread_id = %thread_id,
                request_id = %request_id,
                chars = reply.len(),
                "reply complete"
            );
            if !store.append_reply(&thread_id, Message::assistant(reply)).await {
                warn!(
                    thread_id = %thread_id,
                    request_id = %request_id,
                    "conversation evicted during the turn, reply not stored"
                );
            }
        }))
    }

    /// Run a turn to completion and return the whole reply.
    pub async fn chat(
        &self,
        thread_id: &str,
        message: &str,
        language: Option<&str>,
    ) -> Result<String, AiError> {
        let mut fragments = self.chat_stream(thread_id, message, language).await?;
        let mut reply = String::new();
        while let Some(fragment) = fragments.next().await {
            reply.push_str(&fragment?);
        }
        Ok(reply)
    }
}
