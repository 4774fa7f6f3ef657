//! Events exchanged with the framework AI service

use super::packet::SocketPacket;
use crate::error::ProtocolError;
use serde::Deserialize;
use serde_json::Value;

/// Outbound event carrying `(auxiliary_id, text)`
pub const MESSAGE_EVENT: &str = "message";

/// Inbound event carrying a completion
pub const COMPLETION_EVENT: &str = "completionText";

/// One user submission, ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Auxiliary identifier as entered when the message was submitted
    pub auxiliary_id: String,
    /// Message text as typed
    pub text: String,
}

impl OutboundMessage {
    /// Create an outbound message
    pub fn new(auxiliary_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            auxiliary_id: auxiliary_id.into(),
            text: text.into(),
        }
    }

    /// The `message` event, arguments in positional order
    pub fn to_packet(&self, namespace: &str) -> SocketPacket {
        SocketPacket::event(
            namespace,
            MESSAGE_EVENT,
            [
                Value::String(self.auxiliary_id.clone()),
                Value::String(self.text.clone()),
            ],
        )
    }
}

/// Payload of a `completionText` event
///
/// `status` is carried by the service but not interpreted, so any JSON value
/// is accepted there.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionReply {
    /// Service status code
    #[serde(default)]
    pub status: Option<Value>,
    /// Reply body
    pub data: CompletionData,
}

/// Body of a completion reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    /// Text to display
    pub completion_text: String,
}

impl CompletionReply {
    /// Parse the arguments of a `completionText` event
    ///
    /// Only the first argument is read; extra arguments are ignored.
    pub fn from_args(args: &[Value]) -> Result<Self, ProtocolError> {
        let payload = args
            .first()
            .ok_or_else(|| ProtocolError::InvalidPayload("completion without payload".to_string()))?;
        Self::deserialize(payload).map_err(|e| ProtocolError::InvalidPayload(e.to_string()))
    }

    /// Text to append to the chat
    pub fn text(&self) -> &str {
        &self.data.completion_text
    }
}
