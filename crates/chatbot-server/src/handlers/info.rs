use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn root(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Chatbot API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.engine.model_name(),
        "endpoints": {
            "/chat": "POST - Send a message to the chatbot",
            "/chat/stream": "POST - Send a message and stream the reply as server-sent events",
            "/chat/{thread_id}": "GET - Conversation history; DELETE - Clear it",
            "/health": "GET - Health check",
        }
    }))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "threads": state.engine.thread_count().await,
    }))
}
