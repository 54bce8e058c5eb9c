use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use super::api::SharedState;
use super::refresh::{RefreshOutcome, RefreshTask};
use crate::dashboard::{Lead, LeadStatus, Overview};

/// How often to send WebSocket Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
const PONG_TIMEOUT: Duration = Duration::from_secs(60);

// ── WebSocket message types ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum WsMessage {
    // Per-session refresh
    OverviewRefreshed {
        overview: Overview,
    },
    RefreshFailed {
        error: String,
    },

    // Broadcast to every session after a write
    LeadStatusChanged {
        lead_id: String,
        status: LeadStatus,
        updated_at: DateTime<Utc>,
    },
    LeadNotesChanged {
        lead_id: String,
        notes: String,
    },
    LeadAdded {
        lead: Lead,
    },
}

impl From<RefreshOutcome> for WsMessage {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Refreshed(overview) => WsMessage::OverviewRefreshed { overview },
            RefreshOutcome::Failed(error) => WsMessage::RefreshFailed { error },
        }
    }
}

// ── WebSocket handler ────────────────────────────────────────────────

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (sender, receiver) = socket.split();
    let rx = state.ws_tx.subscribe();

    let (refresh_tx, refresh_rx) = mpsc::channel(4);
    let refresh = RefreshTask::spawn(state.service.clone(), state.refresh_interval, refresh_tx);
    tracing::debug!("websocket session opened");

    run_socket_loop(sender, receiver, rx, refresh_rx).await;

    refresh.stop().await;
    tracing::debug!("websocket session closed");
}

/// Core WebSocket loop with ping/pong keepalive.
///
/// Combines broadcast forwarding, this session's refresh results, client
/// message receiving and periodic ping/pong health checking into a single
/// select loop. If no Pong is received within [`PONG_TIMEOUT`] after a Ping
/// is sent, the connection is considered dead and the loop exits.
async fn run_socket_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    mut rx: broadcast::Receiver<String>,
    mut refresh_rx: mpsc::Receiver<RefreshOutcome>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    // First tick completes immediately
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > PONG_TIMEOUT {
                    tracing::debug!("websocket pong timeout");
                    break;
                }
                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            outcome = refresh_rx.recv() => {
                let Some(outcome) = outcome else { break };
                let Some(json) = encode(&WsMessage::from(outcome)) else { continue };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "websocket client lagged");
                        continue;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}

// ── Broadcast helper ─────────────────────────────────────────────────

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg)
        .inspect_err(|e| tracing::error!(error = %e, "failed to serialize WsMessage"))
        .ok()
}

/// Serialize and broadcast a WsMessage to all connected WebSocket clients.
/// Returns silently even if no clients are connected.
pub fn broadcast_message(tx: &broadcast::Sender<String>, msg: &WsMessage) {
    if let Some(json) = encode(msg) {
        let _ = tx.send(json);
    }
}
