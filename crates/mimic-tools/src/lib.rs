//! Mimic Tools - outbound provider clients
//!
//! - chat: OpenAI-compatible chat completions client

pub mod chat;

pub use chat::{first_choice_text, ChatClient, ChatError, ChatRequest};
