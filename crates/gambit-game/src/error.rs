//! Error types for the game layer.

use gambit_protocol::{ConnectionId, ErrorCode, GameId};

/// Errors that can occur while acting on a game session.
///
/// A rejected operation never mutates the session.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No live game has this id. Finished games are removed immediately,
    /// so this also covers moves sent after a resignation.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The connection is neither white nor black in this game.
    #[error("connection {0} is not a player in game {1}")]
    NotAParticipant(ConnectionId, GameId),

    /// The connection tried to move while it is the opponent's turn.
    #[error("connection {0} moved out of turn in game {1}")]
    NotYourTurn(ConnectionId, GameId),

    /// The connection is already seated in another live game.
    #[error("connection {0} is already playing game {1}")]
    AlreadyInGame(ConnectionId, GameId),
}

impl GameError {
    /// The wire error kind reported to the offending connection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::SessionNotFound,
            Self::NotAParticipant(..) => ErrorCode::NotAParticipant,
            Self::NotYourTurn(..) => ErrorCode::NotYourTurn,
            Self::AlreadyInGame(..) => ErrorCode::AlreadyInGame,
        }
    }
}
