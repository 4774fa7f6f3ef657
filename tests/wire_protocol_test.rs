//! Tests for the frames exchanged with the framework AI service

use framework_chat::socket::packet::{EnginePacket, SocketPacket};
use framework_chat::socket::{CompletionReply, OutboundMessage, COMPLETION_EVENT};

fn outbound_frame(message: &OutboundMessage, namespace: &str) -> String {
    EnginePacket::Message(message.to_packet(namespace).encode()).encode()
}

fn inbound_reply(frame: &str) -> Option<CompletionReply> {
    let EnginePacket::Message(payload) = EnginePacket::decode(frame).ok()? else {
        return None;
    };
    let packet = SocketPacket::decode(&payload).ok()?;
    let (name, args) = packet.event_parts()?;
    if name != COMPLETION_EVENT {
        return None;
    }
    CompletionReply::from_args(args).ok()
}

#[test]
fn test_message_frame() {
    let message = OutboundMessage::new("hello", "hi there");
    assert_eq!(
        outbound_frame(&message, "/"),
        r#"42["message","hello","hi there"]"#
    );
}

#[test]
fn test_message_frame_in_namespace() {
    let message = OutboundMessage::new("hello", "hi there");
    assert_eq!(
        outbound_frame(&message, "/framework"),
        r#"42/framework,["message","hello","hi there"]"#
    );
}

#[test]
fn test_message_frame_escapes_text() {
    let message = OutboundMessage::new("id \"7\"", "line one\nline two");
    let frame = outbound_frame(&message, "/");

    // The payload must stay valid JSON
    let payload: serde_json::Value = serde_json::from_str(&frame[2..]).unwrap();
    assert_eq!(payload[1], "id \"7\"");
    assert_eq!(payload[2], "line one\nline two");
}

#[test]
fn test_completion_frame() {
    let reply =
        inbound_reply(r#"42["completionText",{"status":200,"data":{"completionText":"42"}}]"#)
            .unwrap();
    assert_eq!(reply.text(), "42");
}

#[test]
fn test_completion_frame_ignores_extra_fields() {
    let reply = inbound_reply(
        r#"42["completionText",{"status":201,"data":{"completionText":"ok","tokens":12},"model":"x"}]"#,
    )
    .unwrap();
    assert_eq!(reply.text(), "ok");
}

#[test]
fn test_non_completion_frames() {
    assert!(inbound_reply("2").is_none());
    assert!(inbound_reply(r#"42["message","a","b"]"#).is_none());
    assert!(inbound_reply(r#"42["completionText","plain"]"#).is_none());
    assert!(inbound_reply(r#"40{"sid":"abc"}"#).is_none());
}
