//! The connection registry: who is authenticated on which connection.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself: it uses a plain
//! `HashMap`. It is owned by the dispatcher, which lives inside the single
//! relay task; every event reaches it one at a time.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use gambit_protocol::{ConnectionId, PlayerProfile};

use crate::{LobbyError, PlayerIdentity, PlayerStatus};

/// Maps live connections to the identity they authenticated as.
///
/// ## Lifecycle
///
/// ```text
/// authenticate ──→ register() ──→ set_status() ... ──→ remove()
///                      │                                  │
///                      ▼                                  ▼
///                  [Online]  ⇄ [Searching] ⇄ [Playing]   (gone)
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    players: HashMap<ConnectionId, PlayerIdentity>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `profile` as the identity behind `connection_id`.
    ///
    /// Idempotent per connection: authenticating again replaces the
    /// profile. A fresh entry starts [`PlayerStatus::Online`]; a
    /// replaced entry keeps its status, so re-authenticating mid-game does
    /// not make the connection look idle.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        profile: PlayerProfile,
    ) -> &PlayerIdentity {
        let identity = match self.players.entry(connection_id) {
            Entry::Occupied(slot) => {
                let existing = slot.into_mut();
                existing.profile = profile;
                existing
            }
            Entry::Vacant(slot) => {
                slot.insert(PlayerIdentity::new(connection_id, profile))
            }
        };

        tracing::info!(
            %connection_id,
            username = %identity.profile.username,
            "player authenticated"
        );
        identity
    }

    /// Looks up the identity behind a connection.
    ///
    /// # Errors
    /// Returns [`LobbyError::NotAuthenticated`] if the connection never
    /// registered.
    pub fn lookup(
        &self,
        connection_id: ConnectionId,
    ) -> Result<&PlayerIdentity, LobbyError> {
        self.players
            .get(&connection_id)
            .ok_or(LobbyError::NotAuthenticated(connection_id))
    }

    /// Returns the identity behind a connection, if any.
    pub fn get(&self, connection_id: ConnectionId) -> Option<&PlayerIdentity> {
        self.players.get(&connection_id)
    }

    /// Updates a connection's status. Returns `false` if it is not
    /// registered.
    pub fn set_status(
        &mut self,
        connection_id: ConnectionId,
        status: PlayerStatus,
    ) -> bool {
        match self.players.get_mut(&connection_id) {
            Some(identity) => {
                identity.status = status;
                true
            }
            None => false,
        }
    }

    /// Forgets a connection. Called on disconnect.
    pub fn remove(&mut self, connection_id: ConnectionId) -> Option<PlayerIdentity> {
        self.players.remove(&connection_id)
    }

    /// Number of registered connections with the given status.
    pub fn count(&self, status: PlayerStatus) -> usize {
        self.players.values().filter(|p| p.status == status).count()
    }

    /// Returns the number of registered connections.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
