//! WebSocket session plumbing.
//!
//! Each upgraded socket becomes one signaling session: a writer task drains
//! the per-connection event channel into the socket while the read loop
//! parses frames and forwards them to the relay. When the read loop ends
//! (close, error or shutdown) the relay is notified and the writer exits
//! once the sender side is dropped.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::relay::ConnectionRef;

use super::AppState;

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

/// Run one client session to completion.
#[instrument(skip_all, fields(connection_id))]
async fn client_session(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (sender, mut events) = mpsc::unbounded_channel::<ServerMessage>();
    let connection = ConnectionRef::new(sender);
    tracing::Span::current().record("connection_id", connection.id.as_str());

    info!(target: "signaling.server", "Client connected");

    // Writer task: serialize relay events onto the socket. Exits when the
    // last ConnectionRef clone is dropped or the socket write fails.
    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(target: "signaling.server", error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(frame) = ws_rx.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!(target: "signaling.server", error = %e, "Socket read error");
                break;
            }
        };
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if state.relay.message(connection.clone(), message).await.is_err() {
                        // Relay is shutting down; end the session.
                        break;
                    }
                }
                Err(e) => {
                    debug!(target: "signaling.server", error = %e, "Malformed frame");
                    connection.send(ServerMessage::RoomError {
                        message: "Malformed message".to_string(),
                    });
                }
            },
            Message::Close(_) => break,
            // axum answers pings automatically; binary frames are not part
            // of the protocol.
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Binary(_) => {
                debug!(target: "signaling.server", "Ignoring binary frame");
            }
        }
    }

    info!(target: "signaling.server", "Client disconnected");

    if let Err(e) = state.relay.disconnected(connection.id.clone()).await {
        debug!(target: "signaling.server", error = %e, "Relay unavailable during disconnect");
    }

    // Dropping our ConnectionRef lets the writer drain and exit; the relay
    // dropped its clones during cleanup.
    drop(connection);
    let _ = writer.await;
}
