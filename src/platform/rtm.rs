//! Real-time messaging session: connects, decodes frames, reconnects.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::slack::SlackClient;
use super::{InboundEvent, MessageEvent};
use crate::error::PlatformError;

/// `rtm.connect` error codes that mean the token itself is unusable.
const AUTH_FAILURE_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
];

/// Decoded websocket frame.
#[derive(Debug, PartialEq)]
enum Frame {
    Event(InboundEvent),
    /// Server is about to close the socket
    Goodbye,
    Ignored,
}

/// How a websocket session ended without a transport error.
enum SessionEnd {
    Disconnected(String),
    ReceiverClosed,
}

pub struct RtmConnection {
    client: SlackClient,
    reconnect_delay: Duration,
    ping_interval: Duration,
}

impl RtmConnection {
    pub fn new(client: SlackClient, reconnect_delay: Duration, ping_interval: Duration) -> Self {
        Self {
            client,
            reconnect_delay,
            ping_interval: ping_interval.max(Duration::from_millis(1)),
        }
    }

    /// Start managing the connection in the background.
    ///
    /// Events arrive on the returned receiver in the order they were read.
    /// The task ends after `AuthInvalid` or once the receiver is dropped.
    pub fn spawn(self, buffer: usize) -> (mpsc::Receiver<InboundEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = tokio::spawn(async move { self.manage(tx).await });
        (rx, handle)
    }

    async fn manage(self, tx: mpsc::Sender<InboundEvent>) {
        loop {
            let url = match self.client.rtm_connect().await {
                Ok(url) => url,
                Err(e) if is_auth_failure(&e) => {
                    warn!("Real-time connect rejected credentials: {}", e);
                    let _ = tx.send(InboundEvent::AuthInvalid).await;
                    return;
                }
                Err(e) => {
                    if !self.report(&tx, e.to_string()).await {
                        return;
                    }
                    continue;
                }
            };

            info!("Real-time session connecting");
            let reason = match self.run_session(&url, &tx).await {
                Ok(SessionEnd::ReceiverClosed) => return,
                Ok(SessionEnd::Disconnected(reason)) => reason,
                Err(e) => format!("{:#}", e),
            };
            if !self.report(&tx, reason).await {
                return;
            }
        }
    }

    /// Forward a connection error and wait before the next attempt.
    /// Returns false once nobody is listening.
    async fn report(&self, tx: &mpsc::Sender<InboundEvent>, message: String) -> bool {
        if tx
            .send(InboundEvent::ConnectionError { message })
            .await
            .is_err()
        {
            return false;
        }
        debug!("Reconnecting in {:?}", self.reconnect_delay);
        tokio::time::sleep(self.reconnect_delay).await;
        !tx.is_closed()
    }

    /// Read frames until the socket closes or goes quiet.
    ///
    /// A ping is sent every `ping_interval`; the session is dropped when no
    /// frame at all has arrived for two intervals.
    async fn run_session(&self, url: &str, tx: &mpsc::Sender<InboundEvent>) -> Result<SessionEnd> {
        let (stream, _response) = connect_async(url)
            .await
            .context("failed to connect real-time websocket")?;
        let (mut sink, mut source) = stream.split();

        let mut ping = tokio::time::interval_at(
            Instant::now() + self.ping_interval,
            self.ping_interval,
        );
        let mut last_seen = Instant::now();
        let mut ping_id = 0_u64;

        loop {
            let message = tokio::select! {
                maybe_message = source.next() => match maybe_message {
                    Some(message) => message.context("failed reading real-time websocket message")?,
                    None => {
                        return Ok(SessionEnd::Disconnected("websocket stream ended".to_string()))
                    }
                },
                _ = ping.tick() => {
                    if last_seen.elapsed() >= self.ping_interval * 2 {
                        return Ok(SessionEnd::Disconnected("ping timeout".to_string()));
                    }
                    ping_id += 1;
                    let frame = json!({ "id": ping_id, "type": "ping" }).to_string();
                    sink.send(WsMessage::text(frame))
                        .await
                        .context("failed sending real-time ping")?;
                    continue;
                }
            };
            last_seen = Instant::now();

            let text = match message {
                WsMessage::Text(text) => text.as_str().to_string(),
                WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec())
                    .context("invalid utf-8 real-time payload")?,
                WsMessage::Close(_) => {
                    return Ok(SessionEnd::Disconnected("websocket closed".to_string()))
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            };

            match parse_frame(&text) {
                Ok(Frame::Event(event)) => {
                    if tx.send(event).await.is_err() {
                        return Ok(SessionEnd::ReceiverClosed);
                    }
                }
                Ok(Frame::Goodbye) => {
                    return Ok(SessionEnd::Disconnected("server sent goodbye".to_string()))
                }
                Ok(Frame::Ignored) => {}
                Err(e) => warn!("Skipping undecodable frame: {:#}", e),
            }
        }
    }
}

fn is_auth_failure(error: &PlatformError) -> bool {
    error
        .api_code()
        .is_some_and(|code| AUTH_FAILURE_CODES.contains(&code))
}

fn parse_frame(text: &str) -> Result<Frame> {
    let value: Value = serde_json::from_str(text).context("failed to parse real-time frame")?;
    let frame_type = value.get("type").and_then(Value::as_str).unwrap_or_default();

    match frame_type {
        "message" => {
            let event: MessageEvent =
                serde_json::from_value(value).context("failed to decode message event")?;
            Ok(Frame::Event(InboundEvent::Message(event)))
        }
        "error" => {
            let error = value.get("error");
            let message = error
                .and_then(|e| e.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or("unknown real-time error");
            let code = error
                .and_then(|e| e.get("code"))
                .and_then(Value::as_i64)
                .unwrap_or_default();
            Ok(Frame::Event(InboundEvent::ConnectionError {
                message: format!("{} (code {})", message, code),
            }))
        }
        "goodbye" => Ok(Frame::Goodbye),
        "hello" => {
            info!("Real-time session established");
            Ok(Frame::Ignored)
        }
        _ => Ok(Frame::Ignored),
    }
}
