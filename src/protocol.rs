use crate::types::{GameState, Seat, Winner};
use serde::{Deserialize, Serialize};

/// Messages a client may send over the WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
pub enum ClientMessage {
    SelectPoison { index: usize },
    TakeCandy { index: usize },
    RequestReplay,
}

/// Messages the server sends to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent to a newly registered connection with its assigned seat
    #[serde(rename_all = "camelCase")]
    JoinedLobby { player_index: Seat },
    /// Sent only to a connection rejected because the lobby is full,
    /// or on a malformed inbound message
    Error { payload: String },
    /// Broadcast when the second player arrives or a replay is granted
    StartPoisonSelection,
    /// Broadcast once both poisons are chosen; carries the full game state
    GameStart {
        #[serde(flatten)]
        state: GameState,
    },
    /// Broadcast on every countdown tick that does not expire the turn
    UpdateTimer { timer: i32 },
    /// Broadcast after a successful non-terminal move
    UpdateState {
        #[serde(flatten)]
        state: GameState,
    },
    /// Terminal broadcast; the game state is discarded right after
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: Winner,
        final_state: GameState,
        can_replay: bool,
    },
    /// Sent to the remaining connection after its peer disconnects
    #[serde(rename_all = "camelCase")]
    ReturnToWaiting { player_index: Seat },
}
