use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::ConnId;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection for its whole lifetime
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id: ConnId = ulid::Ulid::new().to_string();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // A rejected connection has already been told the lobby is full; it
    // stays open but takes no further part in the game.
    let registered = state.connect(conn_id.clone(), tx.clone()).await.is_ok();
    tracing::info!(%conn_id, registered, "WebSocket connected");

    loop {
        tokio::select! {
            // Drain messages the orchestrator queued for this connection
            outbound = rx.recv() => {
                let Some(msg) = outbound else { break };
                if let Ok(json) = serde_json::to_string(&msg) {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(%conn_id, "received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => dispatch(msg, &conn_id, &state).await,
                            Err(e) => {
                                tracing::warn!(%conn_id, "failed to parse client message: {e}");
                                let error = ServerMessage::Error {
                                    payload: format!("Invalid message format: {e}"),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(%conn_id, "WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%conn_id, "WebSocket error: {e}");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    drop(tx);
    state.disconnect(&conn_id).await;
    tracing::info!(%conn_id, "WebSocket connection closed");
}

/// Route a parsed client message to the orchestrator. Illegal actions are
/// dropped without a reply, matching the game's wire protocol.
async fn dispatch(msg: ClientMessage, conn_id: &str, state: &Arc<AppState>) {
    let result = match msg {
        ClientMessage::SelectPoison { index } => state.select_poison(conn_id, index).await,
        ClientMessage::TakeCandy { index } => state.take_candy(conn_id, index).await,
        ClientMessage::RequestReplay => state.request_replay(conn_id).await,
    };

    if let Err(SessionError::IllegalAction) = result {
        tracing::debug!(%conn_id, "ignoring illegal action");
    }
}
