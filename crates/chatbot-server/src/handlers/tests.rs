use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use chatbot_ai::{AiClient, AiError, ChatEngine, ChunkStream, Message, StreamEvent};
use serde_json::{json, Value};

use crate::server::configure;
use crate::state::AppState;

/// Echoes the last prompt turn; remembers the system instruction it saw.
#[derive(Default)]
struct EchoClient {
    fail: bool,
    systems: Mutex<Vec<String>>,
}

#[async_trait]
impl AiClient for EchoClient {
    async fn stream_message(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
        if let Some(system) = messages.first() {
            self.systems.lock().unwrap().push(system.content.clone());
        }
        if self.fail {
            return Err(AiError::ApiError("HTTP 503: unavailable".into()));
        }
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let events = vec![
            Ok(StreamEvent::Delta("Echo: ".into())),
            Ok(StreamEvent::Delta(last)),
        ];
        Ok(Box::pin(futures_util::stream::iter(events)))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

fn state_with(client: Arc<EchoClient>) -> web::Data<AppState> {
    web::Data::new(AppState::new(ChatEngine::new(client)))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(configure)).await
    };
}

fn chat_request(body: Value) -> test::TestRequest {
    test::TestRequest::post().uri("/chat").set_json(body)
}

#[actix_web::test]
async fn root_describes_api() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Chatbot API is running");
    assert_eq!(body["model"], "echo");
    assert!(body["endpoints"]["/chat"].is_string());
}

#[actix_web::test]
async fn health_reports_thread_count() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "healthy", "threads": 0 }));
}

#[actix_web::test]
async fn chat_returns_reply_and_thread() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = chat_request(json!({ "message": "Hi! I'm Bob", "thread_id": "abc123" })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["response"], "Echo: Hi! I'm Bob");
    assert_eq!(body["thread_id"], "abc123");
}

#[actix_web::test]
async fn chat_defaults_thread_and_language() {
    let client = Arc::new(EchoClient::default());
    let state = state_with(client.clone());
    let app = app!(state);

    let req = chat_request(json!({ "message": "hello" })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["thread_id"], "default");
    assert!(client.systems.lock().unwrap()[0].contains("English"));
}

#[actix_web::test]
async fn chat_uses_requested_language() {
    let client = Arc::new(EchoClient::default());
    let state = state_with(client.clone());
    let app = app!(state);

    let req = chat_request(json!({ "message": "hola", "language": "Spanish" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let system = client.systems.lock().unwrap()[0].clone();
    assert!(system.contains("Spanish"));
    assert!(!system.contains("English"));
}

#[actix_web::test]
async fn threads_are_isolated_over_http() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = chat_request(json!({ "message": "Hi! I'm Bob", "thread_id": "abc123" })).to_request();
    test::call_service(&app, req).await;
    let req = chat_request(json!({ "message": "What's my name?", "thread_id": "xyz789" })).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/chat/abc123").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::get().uri("/chat/xyz789").to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(first["messages"].as_array().unwrap().len(), 2);
    assert_eq!(first["messages"][0]["content"], "Hi! I'm Bob");
    assert_eq!(second["messages"][0]["content"], "What's my name?");
    assert_eq!(second["messages"][1]["role"], "assistant");
    assert_eq!(second["state"], "idle");
}

#[actix_web::test]
async fn blank_message_is_rejected() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let resp = test::call_service(&app, chat_request(json!({ "message": "   " })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "message must not be empty");
    assert_eq!(state.engine.thread_count().await, 0);
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn upstream_failure_is_internal_error() {
    let client = Arc::new(EchoClient {
        fail: true,
        ..EchoClient::default()
    });
    let state = state_with(client);
    let app = app!(state);

    let resp = test::call_service(&app, chat_request(json!({ "message": "hi" })).to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("503"));

    // The user turn is kept, no reply is recorded.
    let history = state.engine.history("default").await;
    assert_eq!(history, vec![Message::user("hi")]);
}

#[actix_web::test]
async fn delete_clears_thread() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    test::call_service(&app, chat_request(json!({ "message": "hi", "thread_id": "t1" })).to_request()).await;

    let req = test::TestRequest::delete().uri("/chat/t1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Chat history cleared for thread: t1");

    let req = test::TestRequest::get().uri("/chat/t1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["messages"], json!([]));
}

#[actix_web::test]
async fn delete_unknown_thread_succeeds() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = test::TestRequest::delete().uri("/chat/nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

fn sse_payloads(body: &[u8]) -> Vec<Value> {
    std::str::from_utf8(body)
        .unwrap()
        .split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[actix_web::test]
async fn stream_emits_chunks_then_done() {
    let state = state_with(Arc::new(EchoClient::default()));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/chat/stream")
        .set_json(json!({ "message": "hi", "thread_id": "s1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let events = sse_payloads(&test::read_body(resp).await);
    assert_eq!(
        events,
        vec![
            json!({ "type": "chunk", "text": "Echo: " }),
            json!({ "type": "chunk", "text": "hi" }),
            json!({ "type": "done", "response": "Echo: hi", "thread_id": "s1" }),
        ]
    );
    assert_eq!(state.engine.history("s1").await.len(), 2);
}

#[actix_web::test]
async fn stream_reports_upstream_failure() {
    let client = Arc::new(EchoClient {
        fail: true,
        ..EchoClient::default()
    });
    let state = state_with(client);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/chat/stream")
        .set_json(json!({ "message": "hi" }))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;

    let events = sse_payloads(&body);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert!(events[0]["detail"].as_str().unwrap().contains("503"));
}
