//! Wire protocol for Gambit.
//!
//! This crate defines the "language" that chess clients and the server
//! speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the tagged JSON
//!   frames that travel on the wire.
//! - **Value types** ([`TimeControl`], [`Move`], [`PlayerProfile`],
//!   [`Color`], [`GameResult`], ...) — shared by every layer above.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (ClientEvent) → Dispatcher → Lobby / Game
//! ```
//!
//! [`ConnectionId`] is re-exported from the transport so that the lobby
//! and game crates can key their state without depending on sockets.

mod codec;
mod error;
mod number;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use gambit_transport::ConnectionId;
pub use types::{
    ClientEvent, Color, EndReason, ErrorCode, GameId, GameResult, LeaveRequest, Move,
    OPPONENT_DISCONNECTED_MESSAGE, PlayerProfile, ReportedOutcome,
    SEARCHING_MESSAGE, STARTING_POSITION, ServerEvent, TimeControl,
};
