use thiserror::Error;

/// Errors surfaced by the session orchestrator. `LobbyFull` is reported to
/// the offending connection; `IllegalAction` is dropped silently on the wire
/// and only logged server-side.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Lobby is full. Please try again later.")]
    LobbyFull,
    #[error("action is not valid in the current session state")]
    IllegalAction,
}
