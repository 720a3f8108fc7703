//! Conversation engine.
//!
//! A `ChatEngine` owns the store, trimmer and prompt template, and drives
//! one model turn at a time per thread: append the user turn, trim, assemble,
//! stream, then append the assistant turn.

mod chat;
mod manager;
mod types;


pub use chat::ReplyStream;
pub use manager::ChatEngine;
pub use types::TurnState;
