//! A single game between two paired players.

use std::time::SystemTime;

use gambit_lobby::PlayerIdentity;
use gambit_protocol::{Color, ConnectionId, GameId, GameResult, Move, TimeControl};

/// Lifecycle of a session.
///
/// ```text
///   Active ──(resign / reported outcome)──→ Finished
/// ```
///
/// A disconnect removes the session without passing through `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Moves are being relayed.
    Active,
    /// A result has been recorded. Finished sessions are removed from the
    /// store right away, so only returned copies are ever seen in this
    /// state.
    Finished,
}

/// Full state of one game.
///
/// The server never interprets the position: `moves` is an opaque log and
/// the clocks hold whatever the movers last reported.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: GameId,
    pub white: PlayerIdentity,
    pub black: PlayerIdentity,
    pub time_control: TimeControl,
    /// FEN the game started from.
    pub starting_position: String,
    pub moves: Vec<Move>,
    /// Side to move.
    pub turn: Color,
    pub status: SessionStatus,
    pub white_clock_ms: u64,
    pub black_clock_ms: u64,
    pub result: Option<GameResult>,
    pub winner: Option<Color>,
    pub started_at: SystemTime,
}

impl GameSession {
    /// The color `connection_id` plays, or `None` if it is not seated here.
    pub fn color_of(&self, connection_id: ConnectionId) -> Option<Color> {
        if self.white.connection_id == connection_id {
            Some(Color::White)
        } else if self.black.connection_id == connection_id {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn player(&self, color: Color) -> &PlayerIdentity {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// The other participant, if `connection_id` is one of the two.
    pub fn opponent_of(&self, connection_id: ConnectionId) -> Option<&PlayerIdentity> {
        self.color_of(connection_id)
            .map(|color| self.player(color.opposite()))
    }

    /// Both participants' connections, white first.
    pub fn participants(&self) -> [ConnectionId; 2] {
        [self.white.connection_id, self.black.connection_id]
    }

    /// Remaining time for `color`, in milliseconds.
    pub fn clock_ms(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white_clock_ms,
            Color::Black => self.black_clock_ms,
        }
    }

    pub(crate) fn set_clock_ms(&mut self, color: Color, millis: u64) {
        match color {
            Color::White => self.white_clock_ms = millis,
            Color::Black => self.black_clock_ms = millis,
        }
    }

    /// Records the result and marks the session finished.
    pub(crate) fn finish(&mut self, result: GameResult) {
        self.status = SessionStatus::Finished;
        self.result = Some(result);
        self.winner = result.winner();
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
