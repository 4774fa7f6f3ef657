//! Error types for the connection layer
//!
//! Nothing here ever reaches the chat view directly. Session errors are
//! logged and folded into a `ConnectionStatus`; endpoint errors abort start-up.

use std::time::Duration;
use thiserror::Error;

/// The configured endpoint address is not well formed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The address could not be parsed as a URL
    #[error("Invalid endpoint address '{address}': {reason}")]
    Malformed {
        /// Address as configured
        address: String,
        /// Parser message
        reason: String,
    },

    /// The scheme is not one of http, https, ws, wss
    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    /// The address has no host component
    #[error("Endpoint address has no host: {0}")]
    MissingHost(String),

    /// The address carries a path; namespaces are configured separately
    #[error("Endpoint address must not have a path ('{0}'); set FRAMEWORK_NAMESPACE instead")]
    UnexpectedPath(String),
}

/// Malformed or unsupported Engine.IO / Socket.IO packet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Zero-length packet
    #[error("Empty packet")]
    Empty,

    /// First character is not a known packet type
    #[error("Unknown packet type: {0:?}")]
    UnknownType(char),

    /// Binary events and acks need attachments, which this client does not carry
    #[error("Binary packets are not supported")]
    BinaryUnsupported,

    /// The Engine.IO open packet did not carry a valid handshake
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    /// The JSON body of a Socket.IO packet could not be parsed
    #[error("Invalid packet payload: {0}")]
    InvalidPayload(String),

    /// The ack id prefix was not a valid number
    #[error("Invalid ack id: {0}")]
    InvalidAckId(String),
}

/// Errors that end a session
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// WebSocket transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server sent something the client could not decode
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connecting or the handshake took longer than the connect timeout
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// The server refused the namespace connect
    #[error("Namespace connect refused: {0}")]
    Refused(String),

    /// No ping from the server within the heartbeat window
    #[error("No heartbeat from server within {0:?}")]
    HeartbeatTimeout(Duration),

    /// The transport closed before the handshake completed
    #[error("Connection closed during handshake")]
    ClosedDuringHandshake,
}
