//! Connection Manager
//!
//! Owns the single live session to the framework AI service. The session
//! itself runs as a task on the async runtime; this handle is what the chat
//! view holds. Acquired when the view is built, released by `close()` or by
//! dropping the handle, whichever comes first.

use super::endpoint::Endpoint;
use super::events::{CompletionReply, OutboundMessage};
use super::session::{self, SessionChannels, SessionSettings};
use crate::config::ConnectionConfig;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Callback invoked for every `completionText` reply
pub type ReplyHandler = Box<dyn FnMut(CompletionReply) + Send>;

/// Observable state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Handshake in progress
    Connecting,
    /// Namespace joined; messages flow
    Connected,
    /// The server or the network ended an established session
    Disconnected(String),
    /// The session could not be established
    Failed(String),
    /// Released by the owner
    Closed,
}

impl ConnectionStatus {
    /// True once the session task has finished
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionStatus::Connecting | ConnectionStatus::Connected)
    }

    /// Short label for status displays
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected(_) => "Disconnected",
            ConnectionStatus::Failed(_) => "Offline",
            ConnectionStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected(reason) | ConnectionStatus::Failed(reason) => {
                write!(f, "{}: {}", self.label(), reason)
            }
            _ => f.write_str(self.label()),
        }
    }
}

/// Slot holding the one registered reply handler
#[derive(Clone, Default)]
pub(crate) struct ReplySlot(Arc<Mutex<Option<ReplyHandler>>>);

impl ReplySlot {
    fn set(&self, handler: ReplyHandler) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(handler);
        }
    }

    /// Hand a reply to the handler; replies without a handler are dropped
    pub(crate) fn deliver(&self, reply: CompletionReply) {
        match self.0.lock() {
            Ok(mut slot) => match slot.as_mut() {
                Some(handler) => handler(reply),
                None => debug!("No reply handler registered, dropping completion"),
            },
            Err(_) => debug!("Reply handler poisoned, dropping completion"),
        }
    }
}

/// Handle to the single session with the framework AI service
pub struct ConnectionManager {
    /// Queue of messages for the session to write
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    /// Taken by the first `close()`
    shutdown: Option<oneshot::Sender<()>>,
    /// Session status published by the task
    status: watch::Receiver<ConnectionStatus>,
    /// Reply handler shared with the task
    replies: ReplySlot,
    /// Session task
    task: JoinHandle<()>,
}

impl ConnectionManager {
    /// Start a session in the background
    ///
    /// Returns at once. Connection failures never surface here; they are
    /// logged and visible through `status()`.
    pub fn open(endpoint: Endpoint, config: &ConnectionConfig, runtime: &Handle) -> Self {
        let namespace = if config.namespace.starts_with('/') {
            config.namespace.clone()
        } else {
            format!("/{}", config.namespace)
        };
        let settings = SessionSettings {
            endpoint,
            namespace,
            connect_timeout: config.connect_timeout,
        };

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let replies = ReplySlot::default();

        debug!(endpoint = %settings.endpoint, namespace = %settings.namespace, "Opening connection");
        let task = runtime.spawn(session::run(
            settings,
            SessionChannels {
                outbound: outbound_rx,
                shutdown: shutdown_rx,
                status: status_tx,
                replies: replies.clone(),
            },
        ));

        Self {
            outbound: outbound_tx,
            shutdown: Some(shutdown_tx),
            status: status_rx,
            replies,
            task,
        }
    }

    /// Emit a `message` event with `(auxiliary_id, text)`
    ///
    /// Fire-and-forget. Messages queued before the handshake completes are
    /// written once it does; after the session has ended they are dropped.
    pub fn send(&self, auxiliary_id: &str, text: &str) {
        let message = OutboundMessage::new(auxiliary_id, text);
        if self.outbound.send(message).is_err() {
            debug!(status = %self.status.borrow().label(), "Session ended, message dropped");
        }
    }

    /// Register the handler for `completionText` replies, replacing any other
    pub fn on_reply<F>(&mut self, handler: F)
    where
        F: FnMut(CompletionReply) + Send + 'static,
    {
        self.replies.set(Box::new(handler));
    }

    /// Current status and future changes
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Release the session
    ///
    /// Returns `true` the first time; later calls do nothing and return
    /// `false`.
    pub fn close(&mut self) -> bool {
        match self.shutdown.take() {
            Some(shutdown) => {
                // The task may already be gone; either way the session is released.
                let _ = shutdown.send(());
                true
            }
            None => false,
        }
    }

    /// True until `close()` has been called
    pub fn is_open(&self) -> bool {
        self.shutdown.is_some()
    }

    #[cfg(test)]
    pub(crate) fn deliver_reply(&self, reply: CompletionReply) {
        self.replies.deliver(reply);
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.close() {
            debug!(
                task_finished = self.task.is_finished(),
                "Connection released on drop"
            );
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("status", &*self.status.borrow())
            .field("open", &self.is_open())
            .finish()
    }
}
