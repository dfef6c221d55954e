//! Matchmaking: per-time-control FIFO pools of waiting players.
//!
//! Pairing is purely event-driven. A player who finds their pool empty
//! waits; the next player to join the same pool is paired with the oldest
//! waiter. There are no timers and no rating windows, and players with
//! different time controls never meet.

use std::collections::{HashMap, VecDeque};

use gambit_protocol::{Color, ConnectionId, TimeControl};
use rand::Rng;

use crate::{ConnectionRegistry, LobbyError, PlayerIdentity};

/// Two players about to start a game, colors already assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub white: PlayerIdentity,
    pub black: PlayerIdentity,
    pub time_control: TimeControl,
}

impl Pairing {
    /// The player assigned `color`.
    pub fn player(&self, color: Color) -> &PlayerIdentity {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

/// Outcome of [`MatchQueue::enqueue_or_match`].
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Nobody was waiting; the player now waits at `position` (1-based).
    Queued {
        position: usize,
        time_control: TimeControl,
    },
    /// The player was paired with the head of the pool.
    Matched(Pairing),
}

/// All matchmaking pools, keyed by [`TimeControl::key`].
///
/// Invariant: a connection waits in at most one pool. Empty pools are
/// dropped so the map only holds time controls someone is waiting on.
#[derive(Debug, Default)]
pub struct MatchQueue {
    pools: HashMap<String, VecDeque<PlayerIdentity>>,
}

impl MatchQueue {
    /// Creates a queue with no pools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs the connection with the oldest player waiting for the same
    /// time control, or queues it if nobody is waiting.
    ///
    /// Colors are assigned by a fair coin, independent of who arrived
    /// first.
    ///
    /// # Errors
    /// - [`LobbyError::NotAuthenticated`] — the connection is not in
    ///   `registry`.
    /// - [`LobbyError::AlreadyQueued`] — the connection already waits in
    ///   some pool.
    pub fn enqueue_or_match(
        &mut self,
        registry: &ConnectionRegistry,
        connection_id: ConnectionId,
        time_control: TimeControl,
    ) -> Result<MatchResult, LobbyError> {
        self.enqueue_or_match_with(
            registry,
            connection_id,
            time_control,
            &mut rand::rng(),
        )
    }

    /// [`enqueue_or_match`](Self::enqueue_or_match) with a caller-supplied
    /// random source for the color coin.
    pub fn enqueue_or_match_with<R: Rng + ?Sized>(
        &mut self,
        registry: &ConnectionRegistry,
        connection_id: ConnectionId,
        time_control: TimeControl,
        rng: &mut R,
    ) -> Result<MatchResult, LobbyError> {
        let player = registry.lookup(connection_id)?.clone();

        if let Some(key) = self.pool_of(connection_id) {
            return Err(LobbyError::AlreadyQueued(connection_id, key.to_owned()));
        }

        let key = time_control.key();
        let pool = self.pools.entry(key.clone()).or_default();

        let Some(opponent) = pool.pop_front() else {
            pool.push_back(player);
            let position = pool.len();
            tracing::info!(
                %connection_id,
                pool = %key,
                position,
                "player queued"
            );
            return Ok(MatchResult::Queued {
                position,
                time_control,
            });
        };

        if pool.is_empty() {
            self.pools.remove(&key);
        }

        let (white, black) = if rng.random_bool(0.5) {
            (player, opponent)
        } else {
            (opponent, player)
        };

        tracing::info!(
            pool = %key,
            white = %white.connection_id,
            black = %black.connection_id,
            "players paired"
        );

        Ok(MatchResult::Matched(Pairing {
            white,
            black,
            time_control,
        }))
    }

    /// Removes the connection from the first pool it waits in.
    ///
    /// Returns `true` if an entry was removed; a connection that was not
    /// waiting is a no-op.
    pub fn leave(&mut self, connection_id: ConnectionId) -> bool {
        let Some(key) = self.pool_of(connection_id).map(str::to_owned) else {
            return false;
        };

        if let Some(pool) = self.pools.get_mut(&key) {
            if let Some(index) = pool
                .iter()
                .position(|p| p.connection_id == connection_id)
            {
                pool.remove(index);
            }
            if pool.is_empty() {
                self.pools.remove(&key);
            }
        }

        tracing::info!(%connection_id, pool = %key, "player left matchmaking");
        true
    }

    /// Removes every entry for the connection from every pool. Used on
    /// disconnect; never fails. Returns how many entries were removed.
    pub fn leave_all(&mut self, connection_id: ConnectionId) -> usize {
        let mut removed = 0;
        self.pools.retain(|_, pool| {
            let before = pool.len();
            pool.retain(|p| p.connection_id != connection_id);
            removed += before - pool.len();
            !pool.is_empty()
        });
        removed
    }

    /// The key of the pool the connection waits in, if any.
    pub fn pool_of(&self, connection_id: ConnectionId) -> Option<&str> {
        self.pools
            .iter()
            .find(|(_, pool)| {
                pool.iter().any(|p| p.connection_id == connection_id)
            })
            .map(|(key, _)| key.as_str())
    }

    /// Returns `true` if the connection waits in any pool.
    pub fn is_queued(&self, connection_id: ConnectionId) -> bool {
        self.pool_of(connection_id).is_some()
    }

    /// Number of players waiting for `time_control`.
    pub fn waiting(&self, time_control: &TimeControl) -> usize {
        self.pools
            .get(&time_control.key())
            .map_or(0, VecDeque::len)
    }

    /// Total number of waiting players across all pools.
    pub fn len(&self) -> usize {
        self.pools.values().map(VecDeque::len).sum()
    }

    /// Returns `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use gambit_protocol::PlayerProfile;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn blitz() -> TimeControl {
        TimeControl::new(300, 0)
    }

    fn bullet() -> TimeControl {
        TimeControl::new(60, 0)
    }

    /// A registry with connections `1..=n` authenticated as `p1..pn`.
    fn registry_with(n: u64) -> ConnectionRegistry {
        let mut registry = ConnectionRegistry::new();
        for id in 1..=n {
            registry.register(conn(id), PlayerProfile::named(format!("p{id}")));
        }
        registry
    }

    fn expect_matched(result: MatchResult) -> Pairing {
        match result {
            MatchResult::Matched(pairing) => pairing,
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    // =====================================================================
    // enqueue_or_match()
    // =====================================================================

    #[test]
    fn test_enqueue_first_player_is_queued_at_position_one() {
        let registry = registry_with(1);
        let mut queue = MatchQueue::new();

        let result = queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();

        assert_eq!(
            result,
            MatchResult::Queued {
                position: 1,
                time_control: blitz()
            }
        );
        assert_eq!(queue.waiting(&blitz()), 1);
    }

    #[test]
    fn test_enqueue_second_player_matches_with_complementary_colors() {
        let registry = registry_with(2);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();

        let pairing = expect_matched(
            queue.enqueue_or_match(&registry, conn(2), blitz()).unwrap(),
        );

        let mut seated = vec![
            pairing.white.connection_id,
            pairing.black.connection_id,
        ];
        seated.sort();
        assert_eq!(seated, vec![conn(1), conn(2)]);
        assert_eq!(pairing.player(Color::White), &pairing.white);
        assert_eq!(pairing.player(Color::Black), &pairing.black);
        assert_eq!(pairing.time_control, blitz());
        assert!(queue.is_empty(), "matched pool should be dropped");
    }

    #[test]
    fn test_enqueue_alternates_queued_and_matched() {
        let registry = registry_with(6);
        let mut queue = MatchQueue::new();

        for id in 1..=6 {
            let result = queue.enqueue_or_match(&registry, conn(id), blitz()).unwrap();
            if id % 2 == 1 {
                assert!(
                    matches!(result, MatchResult::Queued { position: 1, .. }),
                    "call {id} should queue"
                );
            } else {
                assert!(
                    matches!(result, MatchResult::Matched(_)),
                    "call {id} should match"
                );
            }
        }
    }

    #[test]
    fn test_enqueue_matches_oldest_waiter_first() {
        // The bullet waiter is skipped; the blitz head is taken.
        let registry = registry_with(3);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();
        queue.enqueue_or_match(&registry, conn(2), bullet()).unwrap();

        let pairing = expect_matched(
            queue.enqueue_or_match(&registry, conn(3), blitz()).unwrap(),
        );

        let ids = [pairing.white.connection_id, pairing.black.connection_id];
        assert!(ids.contains(&conn(1)));
        assert!(!ids.contains(&conn(2)));
        assert_eq!(queue.waiting(&bullet()), 1);
    }

    #[test]
    fn test_enqueue_different_time_controls_do_not_match() {
        let registry = registry_with(2);
        let mut queue = MatchQueue::new();

        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();
        let result = queue.enqueue_or_match(&registry, conn(2), bullet()).unwrap();

        assert!(matches!(result, MatchResult::Queued { position: 1, .. }));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_enqueue_increment_is_part_of_the_pool_key() {
        let registry = registry_with(2);
        let mut queue = MatchQueue::new();

        queue.enqueue_or_match(&registry, conn(1), TimeControl::new(180, 0)).unwrap();
        let result = queue
            .enqueue_or_match(&registry, conn(2), TimeControl::new(180, 2))
            .unwrap();

        assert!(matches!(result, MatchResult::Queued { .. }));
    }

    #[test]
    fn test_enqueue_unauthenticated_returns_error() {
        let registry = ConnectionRegistry::new();
        let mut queue = MatchQueue::new();

        let result = queue.enqueue_or_match(&registry, conn(1), blitz());

        assert!(matches!(result, Err(LobbyError::NotAuthenticated(c)) if c == conn(1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_twice_returns_already_queued() {
        // Joining a second pool (or the same one) would let a player be
        // paired with themselves.
        let registry = registry_with(1);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();

        let same = queue.enqueue_or_match(&registry, conn(1), blitz());
        let other = queue.enqueue_or_match(&registry, conn(1), bullet());

        assert!(matches!(same, Err(LobbyError::AlreadyQueued(_, ref k)) if k == "300+0"));
        assert!(matches!(other, Err(LobbyError::AlreadyQueued(..))));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_color_assignment_is_balanced() {
        let registry = registry_with(2);
        let mut rng = StdRng::seed_from_u64(7);
        let rounds = 2000;
        let mut first_arrival_white = 0;

        for _ in 0..rounds {
            let mut queue = MatchQueue::new();
            queue
                .enqueue_or_match_with(&registry, conn(1), blitz(), &mut rng)
                .unwrap();
            let pairing = expect_matched(
                queue
                    .enqueue_or_match_with(&registry, conn(2), blitz(), &mut rng)
                    .unwrap(),
            );
            if pairing.white.connection_id == conn(1) {
                first_arrival_white += 1;
            }
        }

        let share = f64::from(first_arrival_white) / f64::from(rounds);
        assert!(
            (0.45..=0.55).contains(&share),
            "white share for first arrival was {share}"
        );
    }

    // =====================================================================
    // leave() / leave_all()
    // =====================================================================

    #[test]
    fn test_leave_removes_waiting_player() {
        let registry = registry_with(2);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();

        assert!(queue.leave(conn(1)));

        assert!(queue.is_empty());
        // The next player now waits instead of matching a ghost.
        let result = queue.enqueue_or_match(&registry, conn(2), blitz()).unwrap();
        assert!(matches!(result, MatchResult::Queued { position: 1, .. }));
    }

    #[test]
    fn test_leave_absent_player_is_noop() {
        let registry = registry_with(1);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();

        assert!(!queue.leave(conn(2)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_leave_all_only_touches_that_players_pool() {
        let registry = registry_with(3);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), blitz()).unwrap();
        queue.enqueue_or_match(&registry, conn(2), bullet()).unwrap();

        let removed = queue.leave_all(conn(1));

        assert_eq!(removed, 1);
        assert_eq!(queue.waiting(&blitz()), 0);
        assert_eq!(queue.waiting(&bullet()), 1);
    }

    #[test]
    fn test_leave_all_never_queued_returns_zero() {
        let mut queue = MatchQueue::new();
        assert_eq!(queue.leave_all(conn(5)), 0);
    }

    #[test]
    fn test_pool_of_reports_key() {
        let registry = registry_with(1);
        let mut queue = MatchQueue::new();
        queue.enqueue_or_match(&registry, conn(1), bullet()).unwrap();

        assert_eq!(queue.pool_of(conn(1)), Some("60+0"));
        assert!(queue.is_queued(conn(1)));
        assert!(!queue.is_queued(conn(2)));
    }
}
