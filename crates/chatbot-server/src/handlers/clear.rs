use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

/// `DELETE /chat/{thread_id}`. Succeeds for unknown threads too.
pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let thread_id = path.into_inner();
    state.engine.clear(&thread_id).await;

    HttpResponse::Ok().json(json!({
        "message": format!("Chat history cleared for thread: {thread_id}"),
    }))
}
