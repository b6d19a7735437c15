mod game;
mod registry;

use crate::config::ServerConfig;
use crate::protocol::ServerMessage;
use crate::types::{ConnId, GameState, Seat, Winner};
use tokio::sync::{mpsc, Mutex};

/// A registered player: its seat plus the outbound channel drained by the
/// connection's socket task.
pub struct PlayerConn {
    pub conn_id: ConnId,
    pub seat: Seat,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

/// The single lobby. Every mutable field lives behind one lock so that
/// player moves and timer ticks are linearized.
#[derive(Default)]
pub struct Lobby {
    pub players: Vec<PlayerConn>,
    pub game: Option<GameState>,
    /// Bumped on every fresh game state; a timer task spawned for an older
    /// generation exits on its next wake.
    pub generation: u64,
}

impl Lobby {
    pub fn seat_of(&self, conn_id: &str) -> Option<Seat> {
        self.players
            .iter()
            .find(|p| p.conn_id == conn_id)
            .map(|p| p.seat)
    }

    /// Deliver a message to one connection. Send failures mean the socket
    /// task is gone; the disconnect handler will clean up.
    pub fn send_to(&self, conn_id: &str, msg: ServerMessage) {
        if let Some(player) = self.players.iter().find(|p| p.conn_id == conn_id) {
            let _ = player.tx.send(msg);
        }
    }

    /// Deliver a message to every registered connection
    pub fn broadcast(&self, msg: ServerMessage) {
        for player in &self.players {
            let _ = player.tx.send(msg.clone());
        }
    }

    /// Install a fresh game state, invalidating any running timer task
    pub fn new_game(&mut self, turn_seconds: i32) {
        self.generation += 1;
        self.game = Some(GameState::new(turn_seconds));
    }

    /// Terminate the current game: set the terminal fields, broadcast
    /// `gameOver`, then discard the state. Idempotent — the loser of a race
    /// between a move and a timer expiry finds the state already gone and
    /// does nothing.
    pub fn end_game(&mut self, winner: Winner) {
        let Some(mut game) = self.game.take() else {
            return;
        };
        game.game_over = true;
        game.winner = Some(winner);

        self.broadcast(ServerMessage::GameOver {
            winner,
            final_state: game,
            can_replay: self.players.len() == 2,
        });
    }
}

/// Shared application state
pub struct AppState {
    pub lobby: Mutex<Lobby>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            lobby: Mutex::new(Lobby::default()),
            config,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::protocol::ServerMessage;

    #[tokio::test]
    async fn end_game_is_idempotent() {
        let state = new_state();
        let (_, mut rx0) = connect(&state, "a").await;
        let (_, mut rx1) = connect(&state, "b").await;
        drain(&mut rx0);
        drain(&mut rx1);

        let mut lobby = state.lobby.lock().await;
        lobby.end_game(Winner::Seat(Seat(1)));
        lobby.end_game(Winner::Seat(Seat(0)));
        drop(lobby);

        let game_overs = drain(&mut rx0)
            .into_iter()
            .filter(|m| matches!(m, ServerMessage::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert!(state.lobby.lock().await.game.is_none());
    }

    #[tokio::test]
    async fn end_game_reports_replayability() {
        let state = new_state();
        let (_, mut rx0) = connect(&state, "a").await;
        let (_, mut rx1) = connect(&state, "b").await;
        drain(&mut rx0);
        drain(&mut rx1);

        let mut lobby = state.lobby.lock().await;
        lobby.end_game(Winner::Both);
        drop(lobby);

        match drain(&mut rx0).pop() {
            Some(ServerMessage::GameOver {
                winner, can_replay, ..
            }) => {
                assert_eq!(winner, Winner::Both);
                assert!(can_replay);
            }
            other => panic!("expected gameOver, got {other:?}"),
        }
    }
}
