//! WebSocket bridge for the mock push channel
//!
//! Each connected client gets its own subscription to the feed; the
//! subscription is dropped when the socket closes, which unsubscribes
//! the client. A client that falls behind skips missed ticks.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let client_id = Uuid::new_v4();
    info!("Feed client {} connected", client_id);

    let mut rx = state.feed.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            tick = rx.recv() => {
                match tick {
                    Ok(tick) => {
                        let payload = match serde_json::to_string(&tick) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("Failed to serialize tick: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Feed client {} lagged, skipped {} ticks", client_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // The feed is push-only; client text is ignored
                    }
                    Some(Err(e)) => {
                        debug!("Feed client {} socket error: {}", client_id, e);
                        break;
                    }
                }
            }
        }
    }

    // rx drops here, unsubscribing the client from the feed
    info!("Feed client {} disconnected", client_id);
}
