//! Framework Chat Library
//!
//! A single-window chat widget that relays user messages to a framework AI
//! service over Socket.IO and shows its replies. The binary is in
//! `src/main.rs`; the modules are exposed here for testing.

pub mod app;
pub mod config;
pub mod error;
pub mod socket;
/// Chat view state
///
/// The append-only conversation and the two input fields.
pub mod state;
/// Chat widget rendering
///
/// Layout and components drawn with egui.
pub mod ui;
