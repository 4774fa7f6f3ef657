//! Engine.IO and Socket.IO packet codec
//!
//! Each WebSocket text frame carries one Engine.IO packet. Engine.IO
//! `message` packets carry one Socket.IO packet:
//!
//! ```text
//! <type>[<namespace>,][<ack id>][<json>]
//! ```
//!
//! Only the text encoding is implemented. Binary events and acks are
//! rejected.

use crate::error::ProtocolError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Namespace every Socket.IO server serves
pub const DEFAULT_NAMESPACE: &str = "/";

/// Engine.IO handshake sent by the server in the open packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id
    pub sid: String,
    /// Transports the server offers to upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds
    pub ping_interval: u64,
    /// Grace period for a ping to arrive, in milliseconds
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest the client waits for any server traffic before giving up
    pub fn heartbeat_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// Session opened
    Open(Handshake),
    /// Transport closing
    Close,
    /// Heartbeat ping with optional probe payload
    Ping(String),
    /// Heartbeat answer
    Pong(String),
    /// Carries one Socket.IO packet
    Message(String),
    /// Transport upgrade
    Upgrade,
    /// No-op
    Noop,
}

impl EnginePacket {
    /// Decode one text frame
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();

        match kind {
            '0' => serde_json::from_str(body)
                .map(EnginePacket::Open)
                .map_err(|e| ProtocolError::InvalidHandshake(e.to_string())),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(body.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(ProtocolError::UnknownType(other)),
        }
    }

    /// Encode as one text frame
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => {
                let body = json!({
                    "sid": handshake.sid,
                    "upgrades": handshake.upgrades,
                    "pingInterval": handshake.ping_interval,
                    "pingTimeout": handshake.ping_timeout,
                    "maxPayload": handshake.max_payload,
                });
                format!("0{}", body)
            }
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(body) => format!("2{}", body),
            EnginePacket::Pong(body) => format!("3{}", body),
            EnginePacket::Message(body) => format!("4{}", body),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

/// Socket.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Join a namespace (client) or acknowledge the join (server)
    Connect {
        /// Namespace
        namespace: String,
        /// Auth payload (client) or `{ sid }` (server)
        data: Option<Value>,
    },
    /// Leave a namespace
    Disconnect {
        /// Namespace
        namespace: String,
    },
    /// Named event; `data[0]` is the event name
    Event {
        /// Namespace
        namespace: String,
        /// Ack id when the sender expects an acknowledgement
        id: Option<u64>,
        /// Event name followed by its arguments
        data: Vec<Value>,
    },
    /// Acknowledgement of an event
    Ack {
        /// Namespace
        namespace: String,
        /// Id of the acknowledged event
        id: u64,
        /// Acknowledgement arguments
        data: Vec<Value>,
    },
    /// The server refused a namespace connect
    ConnectError {
        /// Namespace
        namespace: String,
        /// Error detail, usually `{ message }`
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Build an event packet from a name and positional arguments
    pub fn event(namespace: &str, name: &str, args: impl IntoIterator<Item = Value>) -> Self {
        let mut data = vec![Value::String(name.to_string())];
        data.extend(args);
        SocketPacket::Event {
            namespace: namespace.to_string(),
            id: None,
            data,
        }
    }

    /// Namespace the packet belongs to
    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Event name and arguments, if this is an event with a string name
    pub fn event_parts(&self) -> Option<(&str, &[Value])> {
        match self {
            SocketPacket::Event { data, .. } => match data.split_first() {
                Some((Value::String(name), args)) => Some((name.as_str(), args)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Decode the payload of an Engine.IO message packet
    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        let mut chars = payload.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        match kind {
            '0'..='4' => {}
            '5' | '6' => return Err(ProtocolError::BinaryUnsupported),
            other => return Err(ProtocolError::UnknownType(other)),
        }

        let (namespace, rest) = split_namespace(chars.as_str());
        let (id, rest) = split_ack_id(rest)?;
        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(rest)
                    .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?,
            )
        };
        let namespace = namespace.to_string();

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => Ok(SocketPacket::Event {
                namespace,
                id,
                data: expect_array(data)?,
            }),
            '3' => Ok(SocketPacket::Ack {
                namespace,
                id: id.ok_or_else(|| ProtocolError::InvalidAckId("missing".to_string()))?,
                data: expect_array(data)?,
            }),
            _ => Ok(SocketPacket::ConnectError { namespace, data }),
        }
    }

    /// Encode as the payload of an Engine.IO message packet
    pub fn encode(&self) -> String {
        let (kind, id, data) = match self {
            SocketPacket::Connect { data, .. } => ('0', None, data.clone()),
            SocketPacket::Disconnect { .. } => ('1', None, None),
            SocketPacket::Event { id, data, .. } => ('2', *id, Some(Value::Array(data.clone()))),
            SocketPacket::Ack { id, data, .. } => ('3', Some(*id), Some(Value::Array(data.clone()))),
            SocketPacket::ConnectError { data, .. } => ('4', None, data.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE && !namespace.is_empty() {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = data {
            out.push_str(&data.to_string());
        }
        out
    }
}

fn split_namespace(rest: &str) -> (&str, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE, rest);
    }
    match rest.find(',') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    }
}

fn split_ack_id(rest: &str) -> Result<(Option<u64>, &str), ProtocolError> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, rest));
    }
    let id = rest[..digits]
        .parse()
        .map_err(|_| ProtocolError::InvalidAckId(rest[..digits].to_string()))?;
    Ok((Some(id), &rest[digits..]))
}

fn expect_array(data: Option<Value>) -> Result<Vec<Value>, ProtocolError> {
    match data {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ProtocolError::InvalidPayload(format!(
            "expected an array, got {}",
            other
        ))),
        None => Err(ProtocolError::InvalidPayload("missing payload".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_open() {
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        match EnginePacket::decode(frame).unwrap() {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.heartbeat_window(), Duration::from_secs(45));
                assert_eq!(handshake.max_payload, Some(1_000_000));
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_open_rejects_bad_handshake() {
        assert!(matches!(
            EnginePacket::decode("0{\"sid\":1}"),
            Err(ProtocolError::InvalidHandshake(_))
        ));
    }

    #[test]
    fn test_decode_engine_control_packets() {
        assert_eq!(EnginePacket::decode("1").unwrap(), EnginePacket::Close);
        assert_eq!(
            EnginePacket::decode("2").unwrap(),
            EnginePacket::Ping(String::new())
        );
        assert_eq!(
            EnginePacket::decode("2probe").unwrap(),
            EnginePacket::Ping("probe".to_string())
        );
        assert_eq!(EnginePacket::decode("6").unwrap(), EnginePacket::Noop);
        assert_eq!(EnginePacket::decode(""), Err(ProtocolError::Empty));
        assert_eq!(
            EnginePacket::decode("9"),
            Err(ProtocolError::UnknownType('9'))
        );
    }

    #[test]
    fn test_encode_pong_and_message() {
        assert_eq!(EnginePacket::Pong(String::new()).encode(), "3");
        assert_eq!(
            EnginePacket::Message("40".to_string()).encode(),
            "440"
        );
    }

    #[test]
    fn test_encode_connect_default_namespace() {
        let packet = SocketPacket::Connect {
            namespace: "/".to_string(),
            data: None,
        };
        assert_eq!(packet.encode(), "0");
    }

    #[test]
    fn test_encode_connect_custom_namespace() {
        let packet = SocketPacket::Connect {
            namespace: "/chat".to_string(),
            data: None,
        };
        assert_eq!(packet.encode(), "0/chat,");
    }

    #[test]
    fn test_encode_message_event() {
        let packet = SocketPacket::event(
            "/",
            "message",
            [Value::from("hello"), Value::from("hi there")],
        );
        assert_eq!(packet.encode(), r#"2["message","hello","hi there"]"#);
    }

    #[test]
    fn test_encode_event_with_namespace_and_id() {
        let packet = SocketPacket::Event {
            namespace: "/admin".to_string(),
            id: Some(12),
            data: vec![Value::from("ping")],
        };
        assert_eq!(packet.encode(), r#"2/admin,12["ping"]"#);
    }

    #[test]
    fn test_decode_connect_ack() {
        let packet = SocketPacket::decode(r#"0{"sid":"abc"}"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Connect {
                namespace: "/".to_string(),
                data: Some(json!({"sid": "abc"})),
            }
        );
    }

    #[test]
    fn test_decode_connect_error() {
        let packet = SocketPacket::decode(r#"4/private,{"message":"Not authorized"}"#).unwrap();
        assert_eq!(packet.namespace(), "/private");
        assert!(matches!(packet, SocketPacket::ConnectError { data: Some(_), .. }));
    }

    #[test]
    fn test_decode_event() {
        let packet =
            SocketPacket::decode(r#"2["completionText",{"status":200,"data":{"completionText":"42"}}]"#)
                .unwrap();
        let (name, args) = packet.event_parts().unwrap();
        assert_eq!(name, "completionText");
        assert_eq!(args.len(), 1);
        assert_eq!(args[0]["data"]["completionText"], "42");
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/chat,7["note","x"]"#).unwrap();
        match packet {
            SocketPacket::Event { namespace, id, data } => {
                assert_eq!(namespace, "/chat");
                assert_eq!(id, Some(7));
                assert_eq!(data, vec![json!("note"), json!("x")]);
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_disconnect_with_namespace_only() {
        assert_eq!(
            SocketPacket::decode("1/chat").unwrap(),
            SocketPacket::Disconnect {
                namespace: "/chat".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_binary_and_bad_payloads() {
        assert_eq!(
            SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#),
            Err(ProtocolError::BinaryUnsupported)
        );
        assert!(matches!(
            SocketPacket::decode(r#"2{"not":"an array"}"#),
            Err(ProtocolError::InvalidPayload(_))
        ));
        assert!(matches!(
            SocketPacket::decode("2[broken"),
            Err(ProtocolError::InvalidPayload(_))
        ));
        assert!(matches!(
            SocketPacket::decode("299999999999999999999999[]"),
            Err(ProtocolError::InvalidAckId(_))
        ));
    }

    #[test]
    fn test_event_parts_requires_string_name() {
        let packet = SocketPacket::decode("2[1,2]").unwrap();
        assert!(packet.event_parts().is_none());
    }
}
