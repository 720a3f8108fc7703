use actix_web::{web, HttpResponse};
use chatbot_common::DEFAULT_THREAD_ID;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: String,
}

/// A validated chat request with defaults applied.
struct Turn {
    message: String,
    thread_id: String,
    language: String,
}

impl Turn {
    fn from_request(request: ChatRequest, state: &AppState) -> Result<Self, ApiError> {
        if request.message.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let thread_id = request
            .thread_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THREAD_ID.to_string());
        let language = request
            .language
            .unwrap_or_else(|| state.engine.default_language().to_string());

        Ok(Self {
            message: request.message,
            thread_id,
            language,
        })
    }
}

/// `POST /chat`: run a turn and return the whole reply.
pub async fn handler(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let turn = Turn::from_request(body.into_inner(), &state)?;
    info!(thread_id = %turn.thread_id, "chat request");

    let response = state
        .engine
        .chat(&turn.thread_id, &turn.message, Some(&turn.language))
        .await
        .map_err(|err| {
            warn!(thread_id = %turn.thread_id, error = %err, "chat request failed");
            ApiError::from(err)
        })?;

    Ok(HttpResponse::Ok().json(ChatResponse {
        response,
        thread_id: turn.thread_id,
    }))
}

/// `POST /chat/stream`: run a turn and send fragments as server-sent events.
///
/// Every event is a JSON object tagged by `type`: `chunk` per fragment, then
/// a final `done` with the whole reply, or `error`. Closing the connection
/// abandons the turn.
pub async fn stream(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let turn = Turn::from_request(body.into_inner(), &state)?;
    info!(thread_id = %turn.thread_id, "chat stream request");

    let engine = state.engine.clone();
    let events = async_stream::stream! {
        let mut reply = String::new();
        let mut failure = None;

        match engine
            .chat_stream(&turn.thread_id, &turn.message, Some(&turn.language))
            .await
        {
            Ok(mut fragments) => {
                while let Some(fragment) = fragments.next().await {
                    match fragment {
                        Ok(text) => {
                            reply.push_str(&text);
                            yield Ok::<_, actix_web::Error>(sse_frame(&json!({
                                "type": "chunk",
                                "text": text,
                            })));
                        }
                        Err(err) => {
                            failure = Some(err);
                            break;
                        }
                    }
                }
            }
            Err(err) => failure = Some(err),
        }

        let last = match failure {
            Some(err) => {
                warn!(thread_id = %turn.thread_id, error = %err, "chat stream failed");
                json!({ "type": "error", "detail": err.to_string() })
            }
            None => json!({
                "type": "done",
                "response": reply,
                "thread_id": turn.thread_id,
            }),
        };
        yield Ok(sse_frame(&last));
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events))
}

fn sse_frame(payload: &serde_json::Value) -> web::Bytes {
    web::Bytes::from(format!("data: {payload}\n\n"))
}
