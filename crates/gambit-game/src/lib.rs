//! Game sessions for Gambit.
//!
//! A session is created the moment two players are paired and lives until
//! someone resigns, a reported outcome ends it, or a player disconnects.
//! The server relays moves and enforces turn order; it does not know the
//! rules of chess.
//!
//! # Key types
//!
//! - [`SessionStore`] — live sessions plus a connection → game index
//! - [`Coordinator`] — applies moves, resignations and disconnects
//! - [`GameSession`] / [`SessionStatus`] — the state of one game
//! - [`GameError`] — why an operation was rejected

mod coordinator;
mod error;
mod session;
mod store;

pub use coordinator::{AffectedSession, Coordinator, GameOver, MoveApplied};
pub use error::GameError;
pub use session::{GameSession, SessionStatus};
pub use store::SessionStore;
