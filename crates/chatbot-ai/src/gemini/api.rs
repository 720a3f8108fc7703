//! AiClient trait implementation for GeminiClient (streaming).

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::streaming::sse_events;
use crate::{AiClient, AiError, ChunkStream, Message};

use super::client::{parse_stream_chunk, GeminiClient};

#[async_trait]
impl AiClient for GeminiClient {
    async fn stream_message(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
        let body = self.build_request_body(messages);
        let url = self.api_url(true);

        debug!(
            model = %self.config.model,
            turns = messages.len(),
            "Gemini API streaming request"
        );

        let response = self
            .http
            .post(&url)
            .query(&[("alt", "sse")])
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = GeminiClient::check_status(response).await?;
        let mut events = sse_events(response);

        Ok(Box::pin(async_stream::try_stream! {
            while let Some(event) = events.next().await {
                let event = event?;
                if event.data.trim() == "[DONE]" {
                    break;
                }
                for chunk in parse_stream_chunk(&event.data)? {
                    yield chunk;
                }
            }
        }))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
