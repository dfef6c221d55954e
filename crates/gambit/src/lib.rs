//! # Gambit
//!
//! Real-time chess matchmaking and move relay over WebSockets.
//!
//! Clients authenticate with a self-asserted profile, join a matchmaking
//! pool for a time control, and are paired first-come-first-served. Once
//! paired, the server relays moves between the two players, enforces turn
//! order, and tells each side when the game ends or the opponent drops.
//! It never checks move legality.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit::prelude::*;
//!
//! # async fn run() -> Result<(), GambitError> {
//! let config = ServerConfig::from_env()?;
//! let server = GambitServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`gambit_transport`] — WebSocket accept/send/recv
//! - [`gambit_protocol`] — wire events and the JSON codec
//! - [`gambit_lobby`] — connection registry and matchmaking pools
//! - [`gambit_game`] — game sessions and turn enforcement
//! - this crate — the [`Dispatcher`], the relay actor and the server loop

mod config;
mod dispatcher;
mod error;
mod handler;
mod relay;
mod server;

pub use config::{DEFAULT_COMMAND_BUFFER, DEFAULT_PORT, ServerConfig};
pub use dispatcher::{ConnectionState, Dispatcher, Inbound, Outbound};
pub use error::GambitError;
pub use relay::{OutboundSender, RelayHandle, RelayStats, spawn_relay};
pub use server::{GambitServer, GambitServerBuilder};

pub use gambit_game;
pub use gambit_lobby;
pub use gambit_protocol;
pub use gambit_transport;

/// Everything needed to run a server or drive the dispatcher directly.
pub mod prelude {
    pub use crate::{
        ConnectionState, Dispatcher, GambitError, GambitServer, Inbound, Outbound,
        RelayHandle, RelayStats, ServerConfig,
    };
    pub use gambit_protocol::{
        ClientEvent, Color, ConnectionId, ErrorCode, GameId, GameResult, LeaveRequest, Move,
        PlayerProfile, ServerEvent, TimeControl,
    };
}
