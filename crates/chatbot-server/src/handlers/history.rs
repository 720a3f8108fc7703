use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

/// `GET /chat/{thread_id}`: stored turns plus the thread's current state.
pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let thread_id = path.into_inner();
    let engine = &state.engine;

    HttpResponse::Ok().json(json!({
        "thread_id": thread_id,
        "state": engine.state(&thread_id),
        "language": engine.language(&thread_id).await,
        "messages": engine.history(&thread_id).await,
    }))
}
