use bonbon::config::ServerConfig;
use bonbon::error::SessionError;
use bonbon::protocol::ServerMessage;
use bonbon::state::AppState;
use bonbon::types::{Seat, Winner, CANDY_COUNT};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

async fn connect(
    state: &Arc<AppState>,
    conn_id: &str,
) -> (
    Result<Seat, SessionError>,
    UnboundedReceiver<ServerMessage>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let result = state.connect(conn_id.to_string(), tx).await;
    (result, rx)
}

/// End-to-end flow: matchmaking, poison selection, play to a poison loss,
/// then a replay back into selection.
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::new(ServerConfig::default()));

    // 1. First player waits alone
    let (seat_a, mut rx_a) = connect(&state, "alice").await;
    assert_eq!(seat_a.unwrap(), Seat(0));
    assert!(matches!(
        drain(&mut rx_a).as_slice(),
        [ServerMessage::JoinedLobby {
            player_index: Seat(0)
        }]
    ));

    // 2. Second player arrives: poison selection opens for both
    let (seat_b, mut rx_b) = connect(&state, "bob").await;
    assert_eq!(seat_b.unwrap(), Seat(1));
    let msgs = drain(&mut rx_b);
    assert!(msgs
        .iter()
        .any(|m| matches!(m, ServerMessage::StartPoisonSelection)));
    assert!(matches!(
        drain(&mut rx_a).as_slice(),
        [ServerMessage::StartPoisonSelection]
    ));

    // 3. A third connection is turned away without disturbing the lobby
    let (rejected, mut rx_c) = connect(&state, "carol").await;
    assert_eq!(rejected.unwrap_err(), SessionError::LobbyFull);
    assert!(matches!(
        drain(&mut rx_c).as_slice(),
        [ServerMessage::Error { .. }]
    ));

    // 4. Both choose their poison; gameStart goes out once, seat 0 to move
    state.select_poison("alice", 3).await.unwrap();
    assert!(drain(&mut rx_a).is_empty());
    state.select_poison("bob", 7).await.unwrap();

    match drain(&mut rx_a).as_slice() {
        [ServerMessage::GameStart { state: game }] => {
            assert_eq!(game.turn, Seat(0));
            assert_eq!(game.timer, 30);
            assert!(game.candies.iter().all(|&c| c));
        }
        other => panic!("expected gameStart, got {other:?}"),
    }

    // 5. A safe move flips the turn
    state.take_candy("alice", 0).await.unwrap();
    match drain(&mut rx_b).pop() {
        Some(ServerMessage::UpdateState { state: game }) => {
            assert_eq!(game.turn, Seat(1));
            assert!(!game.candies[0]);
        }
        other => panic!("expected updateState, got {other:?}"),
    }

    // 6. Out-of-turn move from alice changes nothing
    assert_eq!(
        state.take_candy("alice", 1).await,
        Err(SessionError::IllegalAction)
    );
    assert!(drain(&mut rx_a).is_empty());

    // 7. Bob bites alice's poison and loses
    state.take_candy("bob", 3).await.unwrap();
    match drain(&mut rx_a).pop() {
        Some(ServerMessage::GameOver {
            winner,
            final_state,
            can_replay,
        }) => {
            assert_eq!(winner, Winner::Seat(Seat(0)));
            assert_eq!(final_state.winner, Some(Winner::Seat(Seat(0))));
            assert!(final_state.game_over);
            assert!(can_replay);
        }
        other => panic!("expected gameOver, got {other:?}"),
    }

    // 8. Replay returns both players to poison selection with a clean board
    state.request_replay("bob").await.unwrap();
    assert!(matches!(
        drain(&mut rx_a).as_slice(),
        [ServerMessage::StartPoisonSelection]
    ));
}

/// Every safe candy gets eaten; only the two poisons remain, so nobody wins.
#[tokio::test]
async fn test_mutual_elimination() {
    let state = Arc::new(AppState::new(ServerConfig::default()));
    let (_, mut rx_a) = connect(&state, "alice").await;
    let (_, _rx_b) = connect(&state, "bob").await;
    state.select_poison("alice", 3).await.unwrap();
    state.select_poison("bob", 7).await.unwrap();
    drain(&mut rx_a);

    let safe: Vec<usize> = (0..CANDY_COUNT).filter(|&i| i != 3 && i != 7).collect();
    for (n, &index) in safe.iter().enumerate() {
        let conn = if n % 2 == 0 { "alice" } else { "bob" };
        state.take_candy(conn, index).await.unwrap();
    }

    match drain(&mut rx_a).pop() {
        Some(ServerMessage::GameOver { winner, .. }) => assert_eq!(winner, Winner::Both),
        other => panic!("expected gameOver, got {other:?}"),
    }
}

/// Disconnect mid-game: the game dies, the survivor returns to waiting as
/// seat 0, and a lone replay request is refused.
#[tokio::test]
async fn test_disconnect_mid_game() {
    let state = Arc::new(AppState::new(ServerConfig::default()));
    let (_, _rx_a) = connect(&state, "alice").await;
    let (_, mut rx_b) = connect(&state, "bob").await;
    state.select_poison("alice", 3).await.unwrap();
    state.select_poison("bob", 7).await.unwrap();
    drain(&mut rx_b);

    state.disconnect("alice").await;

    assert!(matches!(
        drain(&mut rx_b).as_slice(),
        [ServerMessage::ReturnToWaiting {
            player_index: Seat(0)
        }]
    ));

    assert_eq!(
        state.request_replay("bob").await,
        Err(SessionError::IllegalAction)
    );
    assert!(drain(&mut rx_b).is_empty());

    // the freed seat is usable again
    let (seat, mut rx_c) = connect(&state, "carol").await;
    assert_eq!(seat.unwrap(), Seat(1));
    assert!(drain(&mut rx_c)
        .iter()
        .any(|m| matches!(m, ServerMessage::StartPoisonSelection)));
}

/// The countdown forfeits the idle player and the survivor may replay.
#[tokio::test(start_paused = true)]
async fn test_timeout_forfeit() {
    let state = Arc::new(AppState::new(ServerConfig::default()));
    let (_, mut rx_a) = connect(&state, "alice").await;
    let (_, _rx_b) = connect(&state, "bob").await;
    state.select_poison("alice", 3).await.unwrap();
    state.select_poison("bob", 7).await.unwrap();
    drain(&mut rx_a);

    // seat 0 never moves; the clock runs out after 31 ticks
    tokio::time::sleep(std::time::Duration::from_secs(35)).await;

    let msgs = drain(&mut rx_a);
    let last_tick = msgs
        .iter()
        .filter_map(|m| match m {
            ServerMessage::UpdateTimer { timer } => Some(*timer),
            _ => None,
        })
        .last();
    assert_eq!(last_tick, Some(0));

    match msgs.last() {
        Some(ServerMessage::GameOver { winner, .. }) => {
            assert_eq!(*winner, Winner::Seat(Seat(1)));
        }
        other => panic!("expected gameOver last, got {other:?}"),
    }

    // a replay still works with both players present
    state.request_replay("alice").await.unwrap();
    assert!(matches!(
        drain(&mut rx_a).as_slice(),
        [ServerMessage::StartPoisonSelection]
    ));
}
