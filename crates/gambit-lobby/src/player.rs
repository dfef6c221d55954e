//! Player identity: who is behind a connection, and what they are doing.
//!
//! A [`PlayerIdentity`] is the server's record of an authenticated
//! connection. It tracks:
//! - WHICH connection it belongs to (`ConnectionId`)
//! - WHO the player says they are (`PlayerProfile`, self-asserted)
//! - WHAT they are doing right now (`PlayerStatus`)

use gambit_protocol::{ConnectionId, PlayerProfile};

// ---------------------------------------------------------------------------
// PlayerStatus
// ---------------------------------------------------------------------------

/// What an authenticated connection is currently doing.
///
/// ```text
///   Online ──(join, no match)──→ Searching ──(matched)──→ Playing
///     ↑  │                          │                        │
///     │  └──────(join, match)───────┼───────────────────────→│
///     ├─────────(leave)─────────────┘                        │
///     └──────────────(resign / game over)────────────────────┘
/// ```
///
/// Disconnecting removes the identity altogether, whatever the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Authenticated and idle.
    Online,
    /// Waiting in a matchmaking pool.
    Searching,
    /// Seated in an active game.
    Playing,
}

// ---------------------------------------------------------------------------
// PlayerIdentity
// ---------------------------------------------------------------------------

/// One authenticated connection.
///
/// Created by `authenticate`, destroyed on disconnect. Cloned into
/// matchmaking pools and game sessions, so those copies carry the profile
/// as it was when the player queued.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIdentity {
    /// The transport connection this identity is bound to.
    pub connection_id: ConnectionId,

    /// The profile the client sent with `authenticate`.
    pub profile: PlayerProfile,

    /// Current activity.
    pub status: PlayerStatus,
}

impl PlayerIdentity {
    /// A fresh identity with status [`PlayerStatus::Online`].
    pub fn new(connection_id: ConnectionId, profile: PlayerProfile) -> Self {
        Self {
            connection_id,
            profile,
            status: PlayerStatus::Online,
        }
    }

    /// Shorthand for the profile's username, used in log lines.
    pub fn username(&self) -> &str {
        &self.profile.username
    }
}
