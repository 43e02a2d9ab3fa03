//! WebSocket endpoint for the conversation loop.
//!
//! Flow:
//! 1. Client connects to `/ws?session=<key>` (key optional; one is
//!    generated and reported in the `welcome` frame when absent)
//! 2. Client sends raw text or `{"type":"message","content":...}`
//! 3. Gateway replies with `{"type":"response","content":...}`, errors as
//!    `{"type":"error","content":...}`
//! 4. Gateway pings on an interval; idle sockets are closed after the
//!    configured timeout

use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use vg_domain::error::Error;

use crate::composer;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Message { content: String },
    Response { content: String },
    Error { content: String },
    Welcome { session_key: String },
    Ping,
    Pong,
}

/// An inbound frame after normalization.
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    Ping,
    Message(String),
}

/// Normalize an inbound text frame.
///
/// Accepts the JSON envelope, a bare `"ping"` keepalive, or raw message
/// text for clients that skip the envelope entirely.
fn parse_inbound(text: &str) -> Inbound {
    if text.trim() == "ping" {
        return Inbound::Ping;
    }
    match serde_json::from_str::<Envelope>(text) {
        Ok(Envelope::Ping) => Inbound::Ping,
        Ok(Envelope::Message { content }) => Inbound::Message(content),
        // Other envelope kinds are server-to-client only; treat anything
        // else as raw message text.
        _ => Inbound::Message(text.to_owned()),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Session key to attach to. A fresh one is generated when absent.
    pub session: Option<String>,
}

/// GET /ws — upgrade to WebSocket.
pub async fn chat_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let session_key = query
        .session
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("ws:{}", Uuid::new_v4()));

    ws.on_upgrade(move |socket| handle_socket(socket, state, session_key))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn handle_socket(socket: WebSocket, state: AppState, session_key: String) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    tracing::info!(session_key = %session_key, "websocket connected");

    // Channel for outbound envelopes; a writer task owns the sink so the
    // read loop never blocks on a slow client.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Envelope>(64);

    let writer_key = session_key.clone();
    let writer = tokio::spawn(async move {
        while let Some(env) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&env) {
                Ok(j) => j,
                Err(e) => {
                    tracing::warn!(session_key = %writer_key, error = %e, "envelope serialization failed");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Report the session key so reconnecting clients can resume.
    if outbound_tx
        .send(Envelope::Welcome {
            session_key: session_key.clone(),
        })
        .await
        .is_err()
    {
        tracing::warn!(session_key = %session_key, "client gone before welcome");
        writer.abort();
        return;
    }

    let idle_timeout = Duration::from_secs(state.config.server.ws.idle_timeout_sec);
    let mut keepalive = tokio::time::interval(Duration::from_secs(
        state.config.server.ws.keepalive_interval_sec,
    ));
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    keepalive.tick().await; // first tick completes immediately
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        tracing::debug!(session_key = %session_key, error = %e, "websocket read error");
                        break;
                    }
                    None => break,
                };
                last_activity = Instant::now();

                match msg {
                    Message::Text(text) => {
                        handle_text_frame(&state, &session_key, &text, &outbound_tx).await;
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {
                        // axum answers WS-level pings itself; both count
                        // as liveness.
                    }
                    _ => {}
                }
            }
            _ = keepalive.tick() => {
                if last_activity.elapsed() > idle_timeout {
                    tracing::info!(session_key = %session_key, "idle timeout, closing websocket");
                    break;
                }
                if outbound_tx.send(Envelope::Ping).await.is_err() {
                    break;
                }
            }
        }
    }

    writer.abort();
    tracing::info!(session_key = %session_key, "websocket disconnected");
}

async fn handle_text_frame(
    state: &AppState,
    session_key: &str,
    text: &str,
    outbound_tx: &mpsc::Sender<Envelope>,
) {
    let content = match parse_inbound(text) {
        Inbound::Ping => {
            let _ = outbound_tx.send(Envelope::Pong).await;
            return;
        }
        Inbound::Message(content) => content,
    };

    // One turn per session at a time.
    let _permit = match state.session_locks.try_acquire(session_key) {
        Ok(p) => p,
        Err(busy) => {
            send_or_log(
                state,
                session_key,
                outbound_tx,
                Envelope::Error {
                    content: format!("{busy} — wait for the current reply"),
                },
            )
            .await;
            return;
        }
    };

    let reply = match composer::compose_reply(state, session_key, &content).await {
        Ok(reply) => Envelope::Response {
            content: reply.content,
        },
        Err(Error::EmptyInput) => Envelope::Error {
            content: "message must not be empty".to_owned(),
        },
        Err(e) => {
            tracing::error!(session_key = %session_key, error = %e, "websocket turn failed");
            Envelope::Error {
                content: "An error occurred while processing your message. Please try again."
                    .to_owned(),
            }
        }
    };

    send_or_log(state, session_key, outbound_tx, reply).await;
}

/// Push an envelope to the writer; a failed send means the client went
/// away while the turn was in flight, which only rates a log line.
async fn send_or_log(
    _state: &AppState,
    session_key: &str,
    outbound_tx: &mpsc::Sender<Envelope>,
    env: Envelope,
) {
    if outbound_tx.send(env).await.is_err() {
        tracing::warn!(session_key = %session_key, "client disconnected mid-request, reply discarded");
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
