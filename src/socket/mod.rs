//! Connection to the framework AI service
//!
//! A Socket.IO v4 client over a WebSocket transport, reduced to what the
//! chat widget needs: one namespace, one outbound event, one inbound event.

pub mod endpoint;
pub mod events;
pub mod manager;
pub mod packet;
mod session;

pub use endpoint::Endpoint;
pub use events::{CompletionReply, OutboundMessage, COMPLETION_EVENT, MESSAGE_EVENT};
pub use manager::{ConnectionManager, ConnectionStatus, ReplyHandler};
