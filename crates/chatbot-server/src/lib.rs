//! HTTP API for the chatbot.
//!
//! Thin actix-web layer over [`chatbot_ai::ChatEngine`]: one JSON endpoint
//! for whole replies, one SSE endpoint for incremental replies, plus history,
//! clear, health and info routes.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{configure, run_server};
pub use state::AppState;
