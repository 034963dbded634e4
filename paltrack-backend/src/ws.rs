//! `WebSocket` live update channel.
//!
//! Clients connect to `GET /ws` and receive a text frame `update` each time a
//! snapshot is ingested. The frame carries nothing else: it only says that
//! re-querying `/servers` is worthwhile.
//!
//! Each connection drains its own broadcaster queue, so a stuck socket only
//! ever holds up itself. A write that fails or exceeds the configured send
//! timeout ends the connection and deregisters the subscriber.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use paltrack_store::TransportError;
use tracing::debug;

use crate::AppState;

pub const UPDATE_FRAME: &str = "update";

pub(crate) async fn live_updates(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.broadcaster.subscribe().await;
    let id = subscription.id();
    debug!(subscriber = %id, "live update client connected");

    loop {
        tokio::select! {
            update = subscription.recv() => {
                let Some(update) = update else {
                    debug!(subscriber = %id, "subscription closed by broadcaster");
                    break;
                };
                if let Err(err) = push_update(&mut socket, &state).await {
                    debug!(subscriber = %id, server_id = %update.server_id, error = %err, "live update delivery failed");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "live update client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        break;
                    }
                    // pings are answered by the protocol layer, client text is ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.broadcaster.unsubscribe(id).await;
}

async fn push_update(socket: &mut WebSocket, state: &AppState) -> Result<(), TransportError> {
    match tokio::time::timeout(
        state.ws_send_timeout,
        socket.send(Message::Text(UPDATE_FRAME.into())),
    )
    .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(TransportError::Closed),
        Err(_) => Err(TransportError::TimedOut),
    }
}
