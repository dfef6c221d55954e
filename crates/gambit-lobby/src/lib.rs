//! Lobby layer for Gambit: who is connected, and who is waiting for a game.
//!
//! # Key types
//!
//! - [`ConnectionRegistry`] — authenticated connections and their status
//! - [`MatchQueue`] — per-time-control FIFO pools that pair players
//! - [`PlayerIdentity`] / [`PlayerStatus`] — one authenticated connection
//! - [`LobbyError`] — rejections before a player is seated

mod error;
mod player;
mod queue;
mod registry;

pub use error::LobbyError;
pub use player::{PlayerIdentity, PlayerStatus};
pub use queue::{MatchQueue, MatchResult, Pairing};
pub use registry::ConnectionRegistry;
