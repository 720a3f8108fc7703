//! Gemini API client struct, request building, and response parsing.

use crate::{AiError, Message, Role, StreamEvent, TokenUsage};

use super::config::GeminiConfig;

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!("{}/{}:{}", self.config.api_base, self.config.model, method)
    }

    /// Build the JSON request body for the Gemini API.
    ///
    /// System turns are lifted into `systemInstruction`, in order.
    pub(crate) fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::System => {
                    system_parts.push(serde_json::json!({ "text": msg.content }));
                    continue;
                }
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }]
            }));
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({ "parts": system_parts });
        }

        body
    }

    /// Map a non-success HTTP status to an error.
    pub(crate) async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AiError> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }
        Ok(response)
    }
}

/// Parse one streamed `GenerateContentResponse` payload.
///
/// Text parts become `Delta`s (thought summaries are skipped), usage
/// metadata becomes `Usage`. An `error` object, a blocked prompt, or a
/// candidate that stops for a reason other than `STOP`/`MAX_TOKENS` without
/// any text is surfaced as an API error.
pub(crate) fn parse_stream_chunk(data: &str) -> Result<Vec<StreamEvent>, AiError> {
    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| AiError::ParseError(e.to_string()))?;

    if let Some(error) = json.get("error") {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AiError::ApiError(message));
    }

    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(AiError::ApiError(format!("prompt blocked: {reason}")));
    }

    let mut events = Vec::new();

    if let Some(candidates) = json["candidates"].as_array() {
        for candidate in candidates {
            let before = events.len();
            let parts = candidate["content"]["parts"].as_array();
            for part in parts.into_iter().flatten() {
                if part["thought"].as_bool() == Some(true) {
                    continue;
                }
                if let Some(text) = part["text"].as_str() {
                    if !text.is_empty() {
                        events.push(StreamEvent::Delta(text.to_string()));
                    }
                }
            }

            if events.len() == before {
                if let Some(reason) = candidate["finishReason"].as_str() {
                    if !is_normal_finish(reason) {
                        return Err(AiError::ApiError(format!("reply blocked: {reason}")));
                    }
                }
            }
        }
    }

    if let Some(meta) = json.get("usageMetadata") {
        events.push(StreamEvent::Usage(TokenUsage {
            input_tokens: meta["promptTokenCount"].as_u64().unwrap_or(0),
            output_tokens: meta["candidatesTokenCount"].as_u64().unwrap_or(0),
        }));
    }

    Ok(events)
}

/// Finish reasons that end a reply without withholding it. A `MAX_TOKENS`
/// stop after earlier chunks is a truncated but usable reply.
fn is_normal_finish(reason: &str) -> bool {
    matches!(reason, "STOP" | "MAX_TOKENS" | "FINISH_REASON_UNSPECIFIED")
}
