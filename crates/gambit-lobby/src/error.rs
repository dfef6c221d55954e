//! Error types for the lobby layer.

use gambit_protocol::{ConnectionId, ErrorCode};

/// Errors that can occur before a player is seated in a game.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The connection never sent `authenticate` (or has since been
    /// removed from the registry).
    #[error("connection {0} is not authenticated")]
    NotAuthenticated(ConnectionId),

    /// The connection is already waiting in the pool with this key.
    /// A connection may wait in at most one pool at a time.
    #[error("connection {0} is already queued for {1}")]
    AlreadyQueued(ConnectionId, String),
}

impl LobbyError {
    /// The wire error kind reported to the offending connection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotAuthenticated(_) => ErrorCode::Unauthenticated,
            Self::AlreadyQueued(..) => ErrorCode::AlreadyQueued,
        }
    }
}
