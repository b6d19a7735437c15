//! Session orchestration: poison selection, turn arbitration, replay

use super::AppState;
use crate::error::SessionError;
use crate::protocol::ServerMessage;
use crate::timer;
use crate::types::{Seat, Winner};
use std::sync::Arc;

impl AppState {
    /// Record (or overwrite) a seat's poison choice. When the second choice
    /// lands the game starts: turn goes to seat 0, `gameStart` is broadcast
    /// and the countdown task is spawned. Only valid while a game exists
    /// and has not started yet.
    pub async fn select_poison(
        self: &Arc<Self>,
        conn_id: &str,
        index: usize,
    ) -> Result<(), SessionError> {
        let mut lobby = self.lobby.lock().await;
        let seat = lobby.seat_of(conn_id).ok_or(SessionError::IllegalAction)?;
        let game = lobby.game.as_mut().ok_or(SessionError::IllegalAction)?;
        if game.started || index >= game.candies.len() {
            return Err(SessionError::IllegalAction);
        }

        game.poison_candies.insert(seat, index);
        if game.poison_candies.len() < 2 {
            return Ok(());
        }

        game.turn = Seat(0);
        game.started = true;
        let snapshot = game.clone();
        let generation = lobby.generation;
        lobby.broadcast(ServerMessage::GameStart { state: snapshot });
        drop(lobby);

        tracing::info!(generation, "both poisons chosen, game started");
        timer::spawn_turn_timer(self.clone(), generation);
        Ok(())
    }

    /// Resolve a move by the seat whose turn it is. Picking a poison candy
    /// loses immediately; clearing the last safe candy is a draw; otherwise
    /// the turn flips, the countdown resets and `updateState` goes out.
    pub async fn take_candy(&self, conn_id: &str, index: usize) -> Result<(), SessionError> {
        let mut lobby = self.lobby.lock().await;
        let seat = lobby.seat_of(conn_id).ok_or(SessionError::IllegalAction)?;
        let game = lobby.game.as_mut().ok_or(SessionError::IllegalAction)?;
        if !game.started || game.game_over || seat != game.turn || index >= game.candies.len() {
            return Err(SessionError::IllegalAction);
        }

        if game.is_poison(index) {
            lobby.end_game(Winner::Seat(seat.other()));
            return Ok(());
        }

        game.candies[index] = false;
        if game.only_poison_left() {
            lobby.end_game(Winner::Both);
            return Ok(());
        }

        game.turn = seat.other();
        game.timer = self.config.turn_seconds;
        let snapshot = game.clone();
        lobby.broadcast(ServerMessage::UpdateState { state: snapshot });
        Ok(())
    }

    /// Start a fresh game with the same two players. The generation bump in
    /// `new_game` retires any timer task still running for the old game.
    pub async fn request_replay(&self, conn_id: &str) -> Result<(), SessionError> {
        let mut lobby = self.lobby.lock().await;
        if lobby.seat_of(conn_id).is_none() || lobby.players.len() != 2 {
            return Err(SessionError::IllegalAction);
        }

        lobby.new_game(self.config.turn_seconds);
        lobby.broadcast(ServerMessage::StartPoisonSelection);
        Ok(())
    }
}
