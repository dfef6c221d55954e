//! Session store: every live game, plus which connection sits where.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use gambit_lobby::PlayerIdentity;
use gambit_protocol::{Color, ConnectionId, GameId, STARTING_POSITION, TimeControl};

use crate::{GameError, GameSession, SessionStatus};

/// Suffix for generated game ids. Process-wide, so two sessions created
/// in the same millisecond still get distinct ids.
static NEXT_GAME_SEQ: AtomicU64 = AtomicU64::new(1);

/// Mints a fresh id of the form `game-{unix_millis}-{seq}`.
fn next_game_id() -> GameId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = NEXT_GAME_SEQ.fetch_add(1, Ordering::Relaxed);
    GameId::new(format!("game-{millis}-{seq}"))
}

/// All active sessions, keyed by game id.
///
/// Also keeps a reverse index from each seated connection to its game.
/// A connection is in at most ONE live game (key invariant); the index is
/// updated whenever a session is inserted or removed.
#[derive(Debug, Default)]
pub struct SessionStore {
    games: HashMap<GameId, GameSession>,
    player_games: HashMap<ConnectionId, GameId>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and stores a new session between `white` and `black`.
    ///
    /// The session starts from the standard position with white to move
    /// and both clocks at the time control's initial time.
    ///
    /// # Errors
    /// Returns [`GameError::AlreadyInGame`] if either player is already
    /// seated in a live game. Nothing is stored in that case.
    pub fn create_session(
        &mut self,
        white: PlayerIdentity,
        black: PlayerIdentity,
        time_control: TimeControl,
    ) -> Result<&GameSession, GameError> {
        for player in [&white, &black] {
            if let Some(current) = self.player_games.get(&player.connection_id) {
                return Err(GameError::AlreadyInGame(
                    player.connection_id,
                    current.clone(),
                ));
            }
        }

        let id = next_game_id();
        let clock = time_control.initial_millis();
        let session = GameSession {
            id: id.clone(),
            white,
            black,
            time_control,
            starting_position: STARTING_POSITION.to_owned(),
            moves: Vec::new(),
            turn: Color::White,
            status: SessionStatus::Active,
            white_clock_ms: clock,
            black_clock_ms: clock,
            result: None,
            winner: None,
            started_at: SystemTime::now(),
        };

        for conn in session.participants() {
            self.player_games.insert(conn, id.clone());
        }

        tracing::info!(
            game_id = %id,
            white = %session.white.username(),
            black = %session.black.username(),
            time_control = %time_control,
            "game started"
        );

        Ok(&*self.games.entry(id).or_insert(session))
    }

    /// Returns the session with this id.
    pub fn get(&self, game_id: &GameId) -> Option<&GameSession> {
        self.games.get(game_id)
    }

    pub(crate) fn get_mut(&mut self, game_id: &GameId) -> Option<&mut GameSession> {
        self.games.get_mut(game_id)
    }

    /// Removes a session and frees both of its players' index entries.
    pub fn remove(&mut self, game_id: &GameId) -> Option<GameSession> {
        let session = self.games.remove(game_id)?;
        for conn in session.participants() {
            if self.player_games.get(&conn) == Some(game_id) {
                self.player_games.remove(&conn);
            }
        }
        Some(session)
    }

    /// Drops a connection's index entry without touching any session.
    pub(crate) fn unindex(&mut self, connection_id: ConnectionId) {
        self.player_games.remove(&connection_id);
    }

    /// The game `connection_id` is seated in, if any.
    pub fn game_of(&self, connection_id: ConnectionId) -> Option<&GameId> {
        self.player_games.get(&connection_id)
    }

    /// Ids of every session `connection_id` takes part in, found by a
    /// full scan rather than the index.
    pub fn scan_games_of(&self, connection_id: ConnectionId) -> Vec<GameId> {
        self.games
            .values()
            .filter(|s| s.color_of(connection_id).is_some())
            .map(|s| s.id.clone())
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Returns `true` if no game is in progress.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use gambit_protocol::PlayerProfile;

    use super::*;

    fn player(id: u64, name: &str) -> PlayerIdentity {
        PlayerIdentity::new(ConnectionId::new(id), PlayerProfile::named(name))
    }

    fn blitz() -> TimeControl {
        TimeControl::new(300, 0)
    }

    #[test]
    fn test_create_session_initial_state() {
        let mut store = SessionStore::new();

        let session = store
            .create_session(player(1, "alice"), player(2, "bob"), blitz())
            .unwrap();

        assert_eq!(session.turn, Color::White);
        assert!(session.is_active());
        assert_eq!(session.starting_position, STARTING_POSITION);
        assert!(session.moves.is_empty());
        assert_eq!(session.white_clock_ms, 300_000);
        assert_eq!(session.black_clock_ms, 300_000);
        assert!(session.result.is_none());
        assert!(session.id.as_str().starts_with("game-"));
    }

    #[test]
    fn test_create_session_ids_are_unique() {
        let mut store = SessionStore::new();
        let mut ids = Vec::new();
        for i in 0..50 {
            let id = store
                .create_session(player(i * 2, "w"), player(i * 2 + 1, "b"), blitz())
                .unwrap()
                .id
                .clone();
            ids.push(id);
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_create_session_indexes_both_players() {
        let mut store = SessionStore::new();
        let id = store
            .create_session(player(1, "alice"), player(2, "bob"), blitz())
            .unwrap()
            .id
            .clone();

        assert_eq!(store.game_of(ConnectionId::new(1)), Some(&id));
        assert_eq!(store.game_of(ConnectionId::new(2)), Some(&id));
        assert_eq!(store.game_of(ConnectionId::new(3)), None);
    }

    #[test]
    fn test_create_session_seated_player_returns_already_in_game() {
        let mut store = SessionStore::new();
        store
            .create_session(player(1, "alice"), player(2, "bob"), blitz())
            .unwrap();

        let result = store.create_session(player(3, "carol"), player(2, "bob"), blitz());

        assert!(matches!(result, Err(GameError::AlreadyInGame(c, _)) if c == ConnectionId::new(2)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.game_of(ConnectionId::new(3)), None);
    }

    #[test]
    fn test_remove_clears_index() {
        let mut store = SessionStore::new();
        let id = store
            .create_session(player(1, "alice"), player(2, "bob"), blitz())
            .unwrap()
            .id
            .clone();

        let removed = store.remove(&id);

        assert!(removed.is_some());
        assert!(store.is_empty());
        assert_eq!(store.game_of(ConnectionId::new(1)), None);
        assert_eq!(store.game_of(ConnectionId::new(2)), None);
        assert!(store.remove(&id).is_none(), "second remove is a no-op");
    }

    #[test]
    fn test_scan_games_of_matches_index() {
        let mut store = SessionStore::new();
        let id = store
            .create_session(player(1, "alice"), player(2, "bob"), blitz())
            .unwrap()
            .id
            .clone();

        assert_eq!(store.scan_games_of(ConnectionId::new(2)), vec![id]);
        assert!(store.scan_games_of(ConnectionId::new(9)).is_empty());
    }
}
