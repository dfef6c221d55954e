//! Event dispatcher: turns one inbound event into targeted outbound events.
//!
//! The dispatcher owns the lobby and game state and performs no I/O. The
//! relay actor feeds it one event at a time and delivers whatever it
//! returns, so every state transition here happens with exclusive access.
//!
//! ```text
//!                 authenticate
//! Unauthenticated ────────────→ Authenticated ⇄ Queued
//!                                    ↑  │          │
//!                                    │  └──────────┴──(matched)──→ InSession
//!                                    └─────────(resign / game over)────┘
//! ```
//!
//! Any state moves to disconnected when the transport drops.

use gambit_game::{Coordinator, GameOver, MoveApplied};
use gambit_lobby::{ConnectionRegistry, MatchQueue, MatchResult, Pairing, PlayerStatus};
use gambit_protocol::{
    ClientEvent, Color, ConnectionId, ErrorCode, GameId, Move, OPPONENT_DISCONNECTED_MESSAGE,
    PlayerProfile, ReportedOutcome, SEARCHING_MESSAGE, ServerEvent, TimeControl,
};

/// Something that happened on a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A decoded client event.
    Event(ClientEvent),
    /// The transport closed or failed.
    Disconnect,
}

/// One event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// Where a connection stands, derived from the registry, queue and store.
///
/// A connection the dispatcher has never seen, or one that has
/// disconnected, reports `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unauthenticated,
    Authenticated,
    Queued,
    InSession,
}

/// Routes events to the registry, the matchmaking queue and the session
/// coordinator.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: ConnectionRegistry,
    queue: MatchQueue,
    coordinator: Coordinator,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event from `connection_id` and returns the events to
    /// deliver, in order.
    pub fn handle(&mut self, connection_id: ConnectionId, inbound: Inbound) -> Vec<Outbound> {
        let event = match inbound {
            Inbound::Disconnect => return self.disconnect(connection_id),
            Inbound::Event(ClientEvent::Authenticate(profile)) => {
                return self.authenticate(connection_id, profile);
            }
            Inbound::Event(event) => event,
        };

        if self.registry.get(connection_id).is_none() {
            tracing::debug!(
                %connection_id,
                event = event.name(),
                "event before authentication"
            );
            return vec![reject(connection_id, ErrorCode::Unauthenticated)];
        }

        match event {
            // Handled above.
            ClientEvent::Authenticate(_) => Vec::new(),
            ClientEvent::JoinMatchmaking { time_control } => {
                self.join_matchmaking(connection_id, time_control)
            }
            ClientEvent::LeaveMatchmaking(_) => self.leave_matchmaking(connection_id),
            ClientEvent::MakeMove {
                game_id,
                mv,
                time_left,
                outcome,
            } => self.make_move(connection_id, game_id, mv, time_left, outcome),
            ClientEvent::ResignGame { game_id } => self.resign(connection_id, game_id),
        }
    }

    /// The derived state of a connection.
    pub fn state_of(&self, connection_id: ConnectionId) -> ConnectionState {
        if self.registry.get(connection_id).is_none() {
            ConnectionState::Unauthenticated
        } else if self.coordinator.store().game_of(connection_id).is_some() {
            ConnectionState::InSession
        } else if self.queue.is_queued(connection_id) {
            ConnectionState::Queued
        } else {
            ConnectionState::Authenticated
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    // -- authenticate -----------------------------------------------------

    fn authenticate(&mut self, connection_id: ConnectionId, profile: PlayerProfile) -> Vec<Outbound> {
        let identity = self.registry.register(connection_id, profile);
        vec![Outbound::new(
            connection_id,
            ServerEvent::Authenticated {
                success: true,
                player_info: identity.profile.clone(),
            },
        )]
    }

    // -- join_matchmaking -------------------------------------------------

    fn join_matchmaking(
        &mut self,
        connection_id: ConnectionId,
        time_control: TimeControl,
    ) -> Vec<Outbound> {
        if let Some(game_id) = self.coordinator.store().game_of(connection_id) {
            tracing::debug!(%connection_id, %game_id, "join while in a game");
            return vec![reject(connection_id, ErrorCode::AlreadyInGame)];
        }

        match self
            .queue
            .enqueue_or_match(&self.registry, connection_id, time_control)
        {
            Ok(MatchResult::Queued {
                position,
                time_control,
            }) => {
                self.registry.set_status(connection_id, PlayerStatus::Searching);
                vec![Outbound::new(
                    connection_id,
                    ServerEvent::MatchmakingQueued {
                        position,
                        time_control,
                        message: SEARCHING_MESSAGE.to_owned(),
                    },
                )]
            }
            Ok(MatchResult::Matched(pairing)) => self.start_game(connection_id, pairing),
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "join rejected");
                vec![reject(connection_id, e.code())]
            }
        }
    }

    fn start_game(&mut self, connection_id: ConnectionId, pairing: Pairing) -> Vec<Outbound> {
        let white_profile = pairing.player(Color::White).profile.clone();
        let black_profile = pairing.player(Color::Black).profile.clone();
        let Pairing {
            white,
            black,
            time_control,
        } = pairing;
        let pair = [white.connection_id, black.connection_id];

        let seated = self
            .coordinator
            .create_session(white, black, time_control)
            .map(|s| (s.id.clone(), s.starting_position.clone(), s.participants()));

        let (game_id, position, [white_conn, black_conn]) = match seated {
            Ok(seated) => seated,
            Err(e) => {
                // The waiting player was already popped from the pool.
                tracing::warn!(%connection_id, error = %e, "could not seat matched pair");
                for conn in pair {
                    if self.coordinator.store().game_of(conn).is_none() {
                        self.registry.set_status(conn, PlayerStatus::Online);
                    }
                }
                return vec![reject(connection_id, e.code())];
            }
        };

        for conn in [white_conn, black_conn] {
            self.registry.set_status(conn, PlayerStatus::Playing);
        }

        let started = |color: Color, opponent: PlayerProfile| ServerEvent::GameStarted {
            game_id: game_id.clone(),
            color,
            opponent,
            time_control,
            position: position.clone(),
        };

        vec![
            Outbound::new(white_conn, started(Color::White, black_profile)),
            Outbound::new(black_conn, started(Color::Black, white_profile)),
        ]
    }

    // -- leave_matchmaking ------------------------------------------------

    fn leave_matchmaking(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        if self.queue.leave(connection_id) {
            self.registry.set_status(connection_id, PlayerStatus::Online);
        }
        Vec::new()
    }

    // -- make_move / resign_game ------------------------------------------

    fn make_move(
        &mut self,
        connection_id: ConnectionId,
        game_id: GameId,
        mv: Move,
        time_left: u64,
        outcome: Option<ReportedOutcome>,
    ) -> Vec<Outbound> {
        match self
            .coordinator
            .apply_move(&game_id, connection_id, mv, time_left, outcome)
        {
            Ok(applied) => self.move_made(applied),
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "move rejected");
                vec![reject(connection_id, e.code())]
            }
        }
    }

    fn move_made(&mut self, applied: MoveApplied) -> Vec<Outbound> {
        let MoveApplied {
            game_id,
            mv,
            turn,
            white_time,
            black_time,
            participants,
            ended,
        } = applied;

        let event = ServerEvent::MoveMade {
            game_id,
            mv,
            turn,
            white_time,
            black_time,
        };
        let mut out: Vec<Outbound> = participants
            .iter()
            .map(|&conn| Outbound::new(conn, event.clone()))
            .collect();

        if let Some(over) = ended {
            out.extend(self.game_over(over));
        }
        out
    }

    fn resign(&mut self, connection_id: ConnectionId, game_id: GameId) -> Vec<Outbound> {
        match self.coordinator.resign(&game_id, connection_id) {
            Ok(over) => self.game_over(over),
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "resignation rejected");
                vec![reject(connection_id, e.code())]
            }
        }
    }

    /// Frees both players and tells them how the game ended.
    fn game_over(&mut self, over: GameOver) -> Vec<Outbound> {
        let event = ServerEvent::GameEnded {
            game_id: over.game_id,
            result: over.result,
            winner: over.winner,
            reason: over.reason,
        };
        over.participants
            .iter()
            .map(|&conn| {
                self.registry.set_status(conn, PlayerStatus::Online);
                Outbound::new(conn, event.clone())
            })
            .collect()
    }

    // -- disconnect -------------------------------------------------------

    fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        let dequeued = self.queue.leave_all(connection_id);
        let affected = self.coordinator.disconnect_cleanup(connection_id);
        let identity = self.registry.remove(connection_id);

        tracing::info!(
            %connection_id,
            username = identity.as_ref().map(|p| p.username()),
            dequeued,
            games = affected.len(),
            "player disconnected"
        );

        affected
            .into_iter()
            .map(|a| {
                self.registry.set_status(a.notify, PlayerStatus::Online);
                Outbound::new(
                    a.notify,
                    ServerEvent::OpponentDisconnected {
                        game_id: a.game_id,
                        message: OPPONENT_DISCONNECTED_MESSAGE.to_owned(),
                    },
                )
            })
            .collect()
    }
}

fn reject(connection_id: ConnectionId, code: ErrorCode) -> Outbound {
    Outbound::new(connection_id, ServerEvent::error(code))
}

// =========================================================================
// Tests
// =========================================================================
