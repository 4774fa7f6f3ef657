// State management module
// Handles the conversation and the input fields of the chat view

/// Conversation entries and chat view state
pub mod chat_state;

pub use chat_state::{ChatEntry, ChatState};
