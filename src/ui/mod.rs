// UI module
// Contains the chat layout and its components

/// Reusable widgets
pub mod components;
/// Widget layout
pub mod layout;

pub use components::*;
pub use layout::render_chat_layout;
