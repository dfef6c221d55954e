//! Wire types for Gambit.
//!
//! Every frame is a JSON object of the form
//! `{ "event": "<name>", "data": { ... } }`. Event names are snake_case,
//! payload fields are camelCase, matching what browser chess clients
//! already speak.
//!
//! Two enums cover the whole contract:
//!
//! - [`ClientEvent`] — what a client may send.
//! - [`ServerEvent`] — what the server sends back.
//!
//! The value types ([`TimeControl`], [`Move`], [`PlayerProfile`], ...) are
//! shared with the lobby and game crates so the core never has to convert
//! between "wire" and "domain" shapes.

use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::number::{saturating_u32, saturating_u64};

/// FEN of the standard chess starting position. Every game starts here.
pub const STARTING_POSITION: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Text attached to `matchmaking_queued`.
pub const SEARCHING_MESSAGE: &str = "Searching for opponent...";

/// Text attached to `opponent_disconnected`.
pub const OPPONENT_DISCONNECTED_MESSAGE: &str = "Your opponent has disconnected";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of one game session, e.g. `game-1760600000000-1`.
///
/// Serialized as a plain string (`#[serde(transparent)]`). Clients echo it
/// back verbatim in `make_move` / `resign_game`, so any string is accepted
/// on input; only the server mints new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("white"),
            Self::Black => f.write_str("black"),
        }
    }
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Clock settings for a game: starting time plus per-move increment, both
/// in seconds.
///
/// Also the matchmaking pool selector: two players only meet when their
/// time controls are identical. Fractional or negative values on input are
/// rounded to the nearest whole second first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeControl {
    #[serde(deserialize_with = "saturating_u32")]
    pub initial: u32,
    #[serde(deserialize_with = "saturating_u32")]
    pub increment: u32,
}

impl TimeControl {
    pub fn new(initial: u32, increment: u32) -> Self {
        Self { initial, increment }
    }

    /// The matchmaking pool key, `"{initial}+{increment}"` (e.g. `"300+0"`).
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Starting clock for each side, in milliseconds.
    pub fn initial_millis(&self) -> u64 {
        u64::from(self.initial) * 1000
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.initial, self.increment)
    }
}

/// What a client says about itself when it authenticates.
///
/// Identity is self-asserted. Any fields beyond `username` and `rating`
/// (avatar, country, ...) are kept in `extra` and echoed back to the
/// player and to their opponents untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerProfile {
    /// A profile with just a username.
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            rating: None,
            extra: Map::new(),
        }
    }
}

/// A chess move as the client reported it.
///
/// Only `from` and `to` are required. Everything else (`promotion`,
/// `san`, ...) rides along in `extra` and is relayed as-is; the server
/// never checks legality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Move {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            extra: Map::new(),
        }
    }
}

/// Payload of `leave_matchmaking`.
///
/// Carries nothing. `{}`, `null` and a frame without `data` are all
/// accepted; it serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeaveRequest {}

impl<'de> Deserialize<'de> for LeaveRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<IgnoredAny>::deserialize(deserializer)?;
        Ok(Self {})
    }
}

/// Final score in standard notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

impl GameResult {
    /// The result in which `color` wins.
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }

    /// The winning side, or `None` for a draw.
    pub fn winner(self) -> Option<Color> {
        match self {
            Self::WhiteWins => Some(Color::White),
            Self::BlackWins => Some(Color::Black),
            Self::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhiteWins => f.write_str("1-0"),
            Self::BlackWins => f.write_str("0-1"),
            Self::Draw => f.write_str("1/2-1/2"),
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Resignation,
    Checkmate,
    Stalemate,
    Timeout,
    Draw,
}

/// A game end the mover attaches to their final move.
///
/// The server has no rules engine, so checkmate, stalemate and flag falls
/// are detected by the client and reported alongside the move that caused
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedOutcome {
    pub result: GameResult,
    pub reason: EndReason,
}

/// Machine-readable kind carried by every `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Anything other than `authenticate` sent before authenticating.
    Unauthenticated,
    /// A move sent while it is the opponent's turn.
    NotYourTurn,
    /// The `gameId` does not name a live game.
    SessionNotFound,
    /// The sender is not one of the game's two players.
    NotAParticipant,
    /// `join_matchmaking` while already waiting for an opponent.
    AlreadyQueued,
    /// `join_matchmaking` while still playing a game.
    AlreadyInGame,
    /// The frame could not be decoded.
    InvalidMessage,
}

impl ErrorCode {
    /// The human-readable text sent alongside the code.
    pub fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please authenticate first",
            Self::NotYourTurn => "Not your turn",
            Self::SessionNotFound => "Game not found",
            Self::NotAParticipant => "You are not a player in this game",
            Self::AlreadyQueued => "Already searching for an opponent",
            Self::AlreadyInGame => "Already playing a game",
            Self::InvalidMessage => "Invalid message",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Client → Server events.
///
/// `disconnect` is not listed: the transport reports it, clients never
/// send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// "This is who I am." Always succeeds and may be repeated; the last
    /// profile wins.
    Authenticate(PlayerProfile),

    /// "Find me an opponent with this time control."
    #[serde(rename_all = "camelCase")]
    JoinMatchmaking { time_control: TimeControl },

    /// "Stop searching."
    LeaveMatchmaking(LeaveRequest),

    /// "I played this move; my clock now shows `time_left` ms."
    ///
    /// `timeLeft` is rounded to whole milliseconds and clamped at zero.
    #[serde(rename_all = "camelCase")]
    MakeMove {
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
        #[serde(deserialize_with = "saturating_u64")]
        time_left: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<ReportedOutcome>,
    },

    /// "I resign this game."
    #[serde(rename_all = "camelCase")]
    ResignGame { game_id: GameId },
}

impl ClientEvent {
    /// The wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "authenticate",
            Self::JoinMatchmaking { .. } => "join_matchmaking",
            Self::LeaveMatchmaking(_) => "leave_matchmaking",
            Self::MakeMove { .. } => "make_move",
            Self::ResignGame { .. } => "resign_game",
        }
    }
}

/// Server → Client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `authenticate`, echoing the profile back.
    #[serde(rename_all = "camelCase")]
    Authenticated {
        success: bool,
        player_info: PlayerProfile,
    },

    /// No opponent yet; the sender now waits at `position` (1-based).
    #[serde(rename_all = "camelCase")]
    MatchmakingQueued {
        position: usize,
        time_control: TimeControl,
        message: String,
    },

    /// Sent to both players when a pairing is made. Each side gets its own
    /// `color` and the other side's profile as `opponent`.
    #[serde(rename_all = "camelCase")]
    GameStarted {
        game_id: GameId,
        color: Color,
        opponent: PlayerProfile,
        time_control: TimeControl,
        position: String,
    },

    /// Broadcast to both players after an accepted move.
    #[serde(rename_all = "camelCase")]
    MoveMade {
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
        turn: Color,
        white_time: u64,
        black_time: u64,
    },

    /// Broadcast to both players when a game finishes. `winner` is `null`
    /// for a draw.
    #[serde(rename_all = "camelCase")]
    GameEnded {
        game_id: GameId,
        result: GameResult,
        winner: Option<Color>,
        reason: EndReason,
    },

    /// Sent to the remaining player when the other one drops.
    #[serde(rename_all = "camelCase")]
    OpponentDisconnected { game_id: GameId, message: String },

    /// Sent only to the connection whose event was rejected.
    Error { message: String, code: ErrorCode },
}

impl ServerEvent {
    /// Builds an `error` event with the standard text for `code`.
    pub fn error(code: ErrorCode) -> Self {
        Self::Error {
            message: code.message().to_owned(),
            code,
        }
    }

    /// The wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::MatchmakingQueued { .. } => "matchmaking_queued",
            Self::GameStarted { .. } => "game_started",
            Self::MoveMade { .. } => "move_made",
            Self::GameEnded { .. } => "game_ended",
            Self::OpponentDisconnected { .. } => "opponent_disconnected",
            Self::Error { .. } => "error",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
