//! Background session task
//!
//! Owns the WebSocket for one connection: performs the Engine.IO and
//! Socket.IO handshakes, answers heartbeats, writes queued outbound messages
//! and hands completion replies to the registered handler. Every way the
//! session can end is turned into a final `ConnectionStatus`.

use super::endpoint::Endpoint;
use super::events::{CompletionReply, OutboundMessage, COMPLETION_EVENT};
use super::manager::{ConnectionStatus, ReplySlot};
use super::packet::{EnginePacket, Handshake, SocketPacket};
use crate::error::ConnectionError;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// What the session needs to know to connect
#[derive(Debug, Clone)]
pub(crate) struct SessionSettings {
    pub endpoint: Endpoint,
    pub namespace: String,
    pub connect_timeout: Duration,
}

/// Channels shared with the owning `ConnectionManager`
pub(crate) struct SessionChannels {
    pub outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    pub shutdown: oneshot::Receiver<()>,
    pub status: watch::Sender<ConnectionStatus>,
    pub replies: ReplySlot,
}

/// How an established session ended without an error
#[derive(Debug)]
enum SessionEnd {
    /// The owner released the connection
    Closed,
    /// The server went away
    Disconnected(String),
}

/// Established transport, past both handshakes
struct Transport {
    sink: WsSink,
    source: WsSource,
    handshake: Handshake,
}

/// Run one session to completion
pub(crate) async fn run(settings: SessionSettings, channels: SessionChannels) {
    let SessionChannels {
        mut outbound,
        mut shutdown,
        status,
        replies,
    } = channels;

    let established = tokio::select! {
        result = tokio::time::timeout(settings.connect_timeout, establish(&settings)) => {
            result.unwrap_or(Err(ConnectionError::Timeout(settings.connect_timeout)))
        }
        _ = &mut shutdown => {
            debug!(endpoint = %settings.endpoint, "Connection released before it was established");
            status.send_replace(ConnectionStatus::Closed);
            return;
        }
    };

    let transport = match established {
        Ok(transport) => transport,
        Err(e) => {
            warn!(endpoint = %settings.endpoint, error = %e, "Failed to connect to framework AI");
            status.send_replace(ConnectionStatus::Failed(e.to_string()));
            return;
        }
    };

    info!(
        endpoint = %settings.endpoint,
        sid = %transport.handshake.sid,
        "Connected to framework AI"
    );
    status.send_replace(ConnectionStatus::Connected);

    let final_status = match pump(&settings.namespace, transport, &mut outbound, &mut shutdown, &replies).await {
        Ok(SessionEnd::Closed) => {
            info!(endpoint = %settings.endpoint, "Connection closed");
            ConnectionStatus::Closed
        }
        Ok(SessionEnd::Disconnected(reason)) => {
            warn!(endpoint = %settings.endpoint, reason = %reason, "Disconnected from framework AI");
            ConnectionStatus::Disconnected(reason)
        }
        Err(e) => {
            warn!(endpoint = %settings.endpoint, error = %e, "Connection lost");
            ConnectionStatus::Disconnected(e.to_string())
        }
    };
    status.send_replace(final_status);

    // Whatever is still queued can no longer be delivered.
    outbound.close();
    let mut dropped = 0usize;
    while outbound.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "Discarded outbound messages after session end");
    }
}

/// Connect the WebSocket and complete both handshakes
async fn establish(settings: &SessionSettings) -> Result<Transport, ConnectionError> {
    debug!(endpoint = %settings.endpoint, "Opening WebSocket");
    let (stream, _) = connect_async(settings.endpoint.as_str()).await?;
    let (mut sink, mut source) = stream.split();

    let handshake = await_open(&mut source).await?;
    debug!(
        sid = %handshake.sid,
        ping_interval = handshake.ping_interval,
        ping_timeout = handshake.ping_timeout,
        "Engine.IO session opened"
    );

    let connect = SocketPacket::Connect {
        namespace: settings.namespace.clone(),
        data: None,
    };
    send_packet(&mut sink, &connect).await?;
    await_namespace_ack(&mut sink, &mut source, &settings.namespace).await?;

    Ok(Transport {
        sink,
        source,
        handshake,
    })
}

async fn await_open(source: &mut WsSource) -> Result<Handshake, ConnectionError> {
    while let Some(frame) = source.next().await {
        match frame? {
            Message::Text(text) => match EnginePacket::decode(&text)? {
                EnginePacket::Open(handshake) => return Ok(handshake),
                EnginePacket::Close => break,
                other => debug!(packet = ?other, "Ignoring packet before open"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(ConnectionError::ClosedDuringHandshake)
}

async fn await_namespace_ack(
    sink: &mut WsSink,
    source: &mut WsSource,
    namespace: &str,
) -> Result<(), ConnectionError> {
    while let Some(frame) = source.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match EnginePacket::decode(&text)? {
            EnginePacket::Ping(body) => {
                sink.send(Message::Text(EnginePacket::Pong(body).encode()))
                    .await?
            }
            EnginePacket::Message(payload) => match SocketPacket::decode(&payload)? {
                SocketPacket::Connect { namespace: ns, .. } if ns == namespace => return Ok(()),
                SocketPacket::ConnectError { namespace: ns, data } if ns == namespace => {
                    let reason = data
                        .as_ref()
                        .and_then(|d| d.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| "no reason given".to_string());
                    return Err(ConnectionError::Refused(reason));
                }
                other => debug!(packet = ?other, "Ignoring packet before namespace ack"),
            },
            EnginePacket::Close => break,
            _ => {}
        }
    }
    Err(ConnectionError::ClosedDuringHandshake)
}

/// Steady state: heartbeats, outbound writes, inbound dispatch
async fn pump(
    namespace: &str,
    transport: Transport,
    outbound: &mut mpsc::UnboundedReceiver<OutboundMessage>,
    shutdown: &mut oneshot::Receiver<()>,
    replies: &ReplySlot,
) -> Result<SessionEnd, ConnectionError> {
    let Transport {
        mut sink,
        mut source,
        handshake,
    } = transport;

    let window = handshake.heartbeat_window();
    let heartbeat = tokio::time::sleep(window);
    tokio::pin!(heartbeat);

    loop {
        tokio::select! {
            _ = &mut *shutdown => {
                leave(&mut sink, namespace).await;
                return Ok(SessionEnd::Closed);
            }
            message = outbound.recv() => match message {
                Some(message) => {
                    send_packet(&mut sink, &message.to_packet(namespace)).await?;
                    debug!(text_len = message.text.len(), "Message sent");
                }
                None => {
                    leave(&mut sink, namespace).await;
                    return Ok(SessionEnd::Closed);
                }
            },
            _ = &mut heartbeat => {
                return Err(ConnectionError::HeartbeatTimeout(window));
            }
            frame = source.next() => {
                let frame = match frame {
                    Some(frame) => frame?,
                    None => return Ok(SessionEnd::Disconnected("transport closed".to_string())),
                };
                heartbeat.as_mut().reset(Instant::now() + window);

                // WebSocket pings are answered by tungstenite itself.
                match frame {
                    Message::Text(text) => {
                        if let Some(end) = on_text(&mut sink, namespace, &text, replies).await? {
                            return Ok(end);
                        }
                    }
                    Message::Close(frame) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "server closed the connection".to_string());
                        return Ok(SessionEnd::Disconnected(reason));
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Handle one inbound text frame; `Some` ends the session
async fn on_text(
    sink: &mut WsSink,
    namespace: &str,
    text: &str,
    replies: &ReplySlot,
) -> Result<Option<SessionEnd>, ConnectionError> {
    let packet = match EnginePacket::decode(text) {
        Ok(packet) => packet,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed Engine.IO packet");
            return Ok(None);
        }
    };

    match packet {
        EnginePacket::Ping(body) => {
            sink.send(Message::Text(EnginePacket::Pong(body).encode()))
                .await?;
        }
        EnginePacket::Message(payload) => match SocketPacket::decode(&payload) {
            Ok(SocketPacket::Disconnect { namespace: ns }) if ns == namespace => {
                return Ok(Some(SessionEnd::Disconnected(
                    "server disconnected the namespace".to_string(),
                )));
            }
            Ok(packet) if packet.namespace() == namespace => on_event(&packet, replies),
            Ok(packet) => debug!(namespace = %packet.namespace(), "Ignoring packet for other namespace"),
            Err(e) => warn!(error = %e, "Ignoring malformed Socket.IO packet"),
        },
        EnginePacket::Close => {
            return Ok(Some(SessionEnd::Disconnected(
                "server closed the session".to_string(),
            )));
        }
        _ => {}
    }
    Ok(None)
}

fn on_event(packet: &SocketPacket, replies: &ReplySlot) {
    let Some((name, args)) = packet.event_parts() else {
        debug!(packet = ?packet, "Ignoring non-event packet");
        return;
    };
    if name != COMPLETION_EVENT {
        debug!(event = %name, "Ignoring unhandled event");
        return;
    }

    match CompletionReply::from_args(args) {
        Ok(reply) => {
            debug!(text_len = reply.text().len(), "Completion received");
            replies.deliver(reply);
        }
        Err(e) => warn!(error = %e, "Ignoring malformed completion"),
    }
}

async fn send_packet(sink: &mut WsSink, packet: &SocketPacket) -> Result<(), ConnectionError> {
    let frame = EnginePacket::Message(packet.encode()).encode();
    sink.send(Message::Text(frame)).await?;
    Ok(())
}

/// Leave the namespace and close the transport; errors only get logged
async fn leave(sink: &mut WsSink, namespace: &str) {
    let disconnect = SocketPacket::Disconnect {
        namespace: namespace.to_string(),
    };
    if let Err(e) = send_packet(sink, &disconnect).await {
        debug!(error = %e, "Failed to send disconnect");
    }
    if let Err(e) = sink.close().await {
        debug!(error = %e, "Failed to close WebSocket");
    }
}
