//! Server configuration.

use serde::{Deserialize, Serialize};

use crate::GambitError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3002;

/// Default capacity of the relay command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Settings for a [`GambitServer`](crate::GambitServer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to, e.g. `"0.0.0.0:3002"`.
    pub bind_addr: String,

    /// Capacity of the bounded channel feeding the relay. When it is full,
    /// connection tasks wait before forwarding more events.
    pub command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// - `GAMBIT_BIND` — full listen address; wins over `PORT`.
    /// - `PORT` — listen on `0.0.0.0:{PORT}`.
    ///
    /// With neither set, listens on `0.0.0.0:3002`.
    ///
    /// # Errors
    /// Returns [`GambitError::Config`] if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, GambitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GambitError> {
        let bind_addr = match lookup("GAMBIT_BIND") {
            Some(addr) => addr,
            None => {
                let port = match lookup("PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                        GambitError::Config(format!("PORT={raw:?}: {e}"))
                    })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{port}")
            }
        };

        Ok(Self {
            bind_addr,
            ..Self::default()
        })
    }
}
