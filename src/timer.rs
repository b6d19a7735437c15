//! Per-game countdown task

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::Winner;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the countdown loop for the game of the given generation. Each tick
/// decrements the shared timer under the lobby lock; on expiry the seat that
/// failed to move forfeits. The task retires itself as soon as the game is
/// gone, finished, or replaced by a newer generation — there is no external
/// cancel signal.
pub fn spawn_turn_timer(state: Arc<AppState>, generation: u64) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;

            let mut lobby = state.lobby.lock().await;
            if lobby.generation != generation {
                break;
            }
            let Some(game) = lobby.game.as_mut() else {
                break;
            };
            if game.game_over {
                break;
            }

            game.timer -= 1;
            if game.timer < 0 {
                let winner = Winner::Seat(game.turn.other());
                lobby.end_game(winner);
                break;
            }

            let timer = game.timer;
            lobby.broadcast(ServerMessage::UpdateTimer { timer });
        }
        tracing::debug!(generation, "turn timer task exited");
    });
}
