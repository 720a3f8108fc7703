use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer};
use chatbot_config::schema::ServerConfig;
use tracing::info;

use crate::handlers;
use crate::state::AppState;

/// Register every route. Shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(handlers::info::root))
        .route("/health", web::get().to(handlers::info::health))
        .route("/chat", web::post().to(handlers::chat::handler))
        .route("/chat/stream", web::post().to(handlers::chat::stream))
        .route("/chat/{thread_id}", web::get().to(handlers::history::handler))
        .route("/chat/{thread_id}", web::delete().to(handlers::clear::handler));
}

/// Malformed bodies get a 400 with the same `{detail}` shape as other errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "detail": detail })),
        )
        .into()
    })
}

pub async fn run_server(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);
    let addr = config.bind_addr();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure)
    });
    if config.workers > 0 {
        server = server.workers(config.workers as usize);
    }

    info!(addr = %addr, "chatbot-server listening");
    server.bind(&addr)?.run().await
}
