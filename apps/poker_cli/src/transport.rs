//! Websocket transport: one JSON command or event per text frame.

use std::time::Duration;

use client_core::CommandSink;
use futures::{SinkExt, StreamExt};
use shared::protocol::{Command, Event};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum TransportEvent {
    /// `reconnect` is false for the first successful connection.
    Connected { reconnect: bool },
    Event(Event),
    Disconnected,
}

/// Queues commands for the socket task. Commands sent while disconnected
/// are flushed after the next connect.
pub struct WsCommandSink {
    outbound: mpsc::UnboundedSender<Command>,
}

impl CommandSink for WsCommandSink {
    fn send_command(&self, command: Command) {
        if self.outbound.send(command).is_err() {
            warn!("transport task stopped; command dropped");
        }
    }
}

pub fn spawn(
    ws_url: String,
    reconnect_delay: Duration,
) -> (WsCommandSink, mpsc::UnboundedReceiver<TransportEvent>) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(run(ws_url, reconnect_delay, outbound_rx, inbound_tx));
    (
        WsCommandSink {
            outbound: outbound_tx,
        },
        inbound_rx,
    )
}

async fn run(
    ws_url: String,
    reconnect_delay: Duration,
    mut outbound: mpsc::UnboundedReceiver<Command>,
    inbound: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut connected_before = false;
    while !inbound.is_closed() {
        match connect_async(ws_url.as_str()).await {
            Ok((ws_stream, _)) => {
                info!(url = %ws_url, reconnect = connected_before, "websocket connected");
                if inbound
                    .send(TransportEvent::Connected {
                        reconnect: connected_before,
                    })
                    .is_err()
                {
                    return;
                }
                connected_before = true;

                let (mut ws_writer, mut ws_reader) = ws_stream.split();
                loop {
                    tokio::select! {
                        command = outbound.recv() => {
                            let Some(command) = command else {
                                let _ = ws_writer.close().await;
                                return;
                            };
                            let text = match serde_json::to_string(&command) {
                                Ok(text) => text,
                                Err(err) => {
                                    warn!(command = command.name().as_str(), error = %err, "failed to encode command");
                                    continue;
                                }
                            };
                            if let Err(err) = ws_writer.send(Message::Text(text)).await {
                                warn!(error = %err, "websocket send failed");
                                break;
                            }
                        }
                        message = ws_reader.next() => match message {
                            Some(Ok(Message::Text(text))) => match serde_json::from_str::<Event>(&text) {
                                Ok(event) => {
                                    if inbound.send(TransportEvent::Event(event)).is_err() {
                                        return;
                                    }
                                }
                                Err(err) => warn!(error = %err, "invalid event frame"),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!(error = %err, "websocket receive failed");
                                break;
                            }
                        }
                    }
                }

                if inbound.send(TransportEvent::Disconnected).is_err() {
                    return;
                }
            }
            Err(err) => warn!(url = %ws_url, error = %err, "websocket connect failed"),
        }
        debug!(delay_ms = reconnect_delay.as_millis() as u64, "waiting before reconnect");
        tokio::time::sleep(reconnect_delay).await;
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
