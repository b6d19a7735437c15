//! Connection registry: seat assignment and lobby membership

use super::{AppState, PlayerConn};
use crate::error::SessionError;
use crate::protocol::ServerMessage;
use crate::types::{ConnId, Seat};
use tokio::sync::mpsc::UnboundedSender;

impl AppState {
    /// Register a connection and assign it the next free seat. The second
    /// registration creates a fresh game state and opens poison selection.
    /// A third connection is rejected with `LobbyFull`; it is told so on its
    /// own channel and the socket stays open, unregistered.
    pub async fn connect(
        &self,
        conn_id: ConnId,
        tx: UnboundedSender<ServerMessage>,
    ) -> Result<Seat, SessionError> {
        let mut lobby = self.lobby.lock().await;

        if lobby.players.len() >= 2 {
            let _ = tx.send(ServerMessage::Error {
                payload: SessionError::LobbyFull.to_string(),
            });
            return Err(SessionError::LobbyFull);
        }

        let seat = Seat(lobby.players.len() as u8);
        lobby.players.push(PlayerConn {
            conn_id: conn_id.clone(),
            seat,
            tx,
        });
        lobby.send_to(&conn_id, ServerMessage::JoinedLobby { player_index: seat });
        tracing::info!(%conn_id, %seat, "player joined lobby");

        if lobby.players.len() == 2 {
            lobby.new_game(self.config.turn_seconds);
            lobby.broadcast(ServerMessage::StartPoisonSelection);
        }

        Ok(seat)
    }

    /// Remove a connection. An in-progress game cannot survive a departure,
    /// so the game state is cleared unconditionally; a remaining player is
    /// renumbered to seat 0 and told to wait for a new opponent.
    pub async fn disconnect(&self, conn_id: &str) {
        let mut lobby = self.lobby.lock().await;

        let Some(pos) = lobby.players.iter().position(|p| p.conn_id == conn_id) else {
            return;
        };
        lobby.players.remove(pos);
        lobby.game = None;
        tracing::info!(%conn_id, "player left lobby");

        if let Some(remaining) = lobby.players.first_mut() {
            remaining.seat = Seat(0);
            let remaining_id = remaining.conn_id.clone();
            lobby.send_to(
                &remaining_id,
                ServerMessage::ReturnToWaiting {
                    player_index: Seat(0),
                },
            );
        }
    }
}
