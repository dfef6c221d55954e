//! Unified error type for the Gambit server.

use gambit_game::GameError;
use gambit_lobby::LobbyError;
use gambit_protocol::ProtocolError;
use gambit_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby-level error (unauthenticated, already queued).
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A game-level error (not found, not your turn, ...).
    #[error(transparent)]
    Game(#[from] GameError),

    /// The relay task has stopped and no longer accepts commands.
    #[error("relay is unavailable")]
    RelayUnavailable,

    /// The configured bind address could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use gambit_protocol::{ConnectionId, GameId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let gambit_err: GambitError = err.into();
        assert!(matches!(gambit_err, GambitError::Transport(_)));
        assert!(gambit_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::NotAuthenticated(ConnectionId::new(4));
        let gambit_err: GambitError = err.into();
        assert!(matches!(gambit_err, GambitError::Lobby(_)));
        assert!(gambit_err.to_string().contains("conn-4"));
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::NotFound(GameId::new("game-1-1"));
        let gambit_err: GambitError = err.into();
        assert!(matches!(gambit_err, GambitError::Game(_)));
        assert!(gambit_err.to_string().contains("game-1-1"));
    }
}
