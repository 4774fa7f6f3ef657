//! Chat widget application
//!
//! Ties the chat state, the UI and the connection together. The app owns the
//! `ConnectionManager` for as long as the window is open; dropping the app
//! releases the connection.

use crate::config::WindowConfig;
use crate::socket::{CompletionReply, ConnectionManager, ConnectionStatus, OutboundMessage};
use crate::state::ChatState;
use crate::ui::render_chat_layout;
use eframe::egui;
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;

/// How often the UI wakes up to refresh the connection badge
const STATUS_REFRESH: Duration = Duration::from_secs(1);

/// Main application struct
/// Owns the chat state and the connection to the framework AI service
pub struct ChatApp {
    /// Conversation and input fields
    state: ChatState,
    /// Live session with the service
    connection: ConnectionManager,
    /// Session status, shown as a badge
    status: watch::Receiver<ConnectionStatus>,
    /// Reply texts forwarded from the session task
    replies: mpsc::Receiver<String>,
    /// Presentation settings
    window: WindowConfig,
}

impl ChatApp {
    /// Create the app around an open connection
    /// Registers the reply handler; each reply wakes the UI
    pub fn new(ctx: &egui::Context, mut connection: ConnectionManager, window: WindowConfig) -> Self {
        let (reply_tx, replies) = mpsc::channel();
        let repaint = ctx.clone();
        connection.on_reply(move |reply: CompletionReply| {
            if reply_tx.send(reply.data.completion_text).is_ok() {
                repaint.request_repaint();
            }
        });

        Self {
            state: ChatState::new(),
            status: connection.status(),
            connection,
            replies,
            window,
        }
    }

    /// Chat state, read-only
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Append every reply received since the last frame
    fn receive_replies(&mut self) {
        while let Ok(text) = self.replies.try_recv() {
            self.state.push_reply(text);
        }
    }

    /// Hand a submitted message to the connection
    fn dispatch(&self, message: OutboundMessage) {
        self.connection.send(&message.auxiliary_id, &message.text);
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_replies();

        let status = self.status.borrow().clone();
        if let Some(message) = render_chat_layout(ctx, &mut self.state, &status, &self.window) {
            self.dispatch(message);
        }

        ctx.request_repaint_after(STATUS_REFRESH);
    }
}
