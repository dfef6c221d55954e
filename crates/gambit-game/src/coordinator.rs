//! Session coordinator: applies moves, resignations and disconnects.
//!
//! Every operation either fully succeeds or returns a [`GameError`] and
//! leaves the store untouched. Results carry everything the caller needs
//! to notify players (participants, clocks, result) so no second lookup
//! into the store is required after a session has been removed.

use gambit_lobby::PlayerIdentity;
use gambit_protocol::{
    Color, ConnectionId, EndReason, GameId, GameResult, Move, ReportedOutcome,
    TimeControl,
};

use crate::{GameError, GameSession, SessionStore};

/// An accepted move, ready to broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveApplied {
    pub game_id: GameId,
    pub mv: Move,
    /// Side to move after this move.
    pub turn: Color,
    pub white_time: u64,
    pub black_time: u64,
    pub participants: [ConnectionId; 2],
    /// Set when the mover reported that this move ended the game.
    pub ended: Option<GameOver>,
}

/// A finished game. The session has already been removed from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOver {
    pub game_id: GameId,
    pub result: GameResult,
    pub winner: Option<Color>,
    pub reason: EndReason,
    pub participants: [ConnectionId; 2],
}

/// A session torn down because one of its players disconnected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedSession {
    pub game_id: GameId,
    /// The remaining player, who should be told.
    pub notify: ConnectionId,
}

/// Owns the [`SessionStore`] and is the only thing that mutates sessions.
#[derive(Debug, Default)]
pub struct Coordinator {
    store: SessionStore,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Seats a freshly matched pair. See [`SessionStore::create_session`].
    pub fn create_session(
        &mut self,
        white: PlayerIdentity,
        black: PlayerIdentity,
        time_control: TimeControl,
    ) -> Result<&GameSession, GameError> {
        self.store.create_session(white, black, time_control)
    }

    /// Applies a move sent by `connection_id`.
    ///
    /// The move is appended verbatim, the turn flips, and the mover's
    /// clock is set to `time_left_ms` as reported. The opponent's clock is
    /// not touched. If `outcome` is present the game then finishes and the
    /// session is removed.
    ///
    /// # Errors
    /// - [`GameError::NotFound`] — no live game with this id.
    /// - [`GameError::NotAParticipant`] — the sender is not seated here.
    /// - [`GameError::NotYourTurn`] — the sender's color is not to move.
    pub fn apply_move(
        &mut self,
        game_id: &GameId,
        connection_id: ConnectionId,
        mv: Move,
        time_left_ms: u64,
        outcome: Option<ReportedOutcome>,
    ) -> Result<MoveApplied, GameError> {
        let session = self
            .store
            .get_mut(game_id)
            .ok_or_else(|| GameError::NotFound(game_id.clone()))?;

        let color = session
            .color_of(connection_id)
            .ok_or_else(|| GameError::NotAParticipant(connection_id, game_id.clone()))?;

        if color != session.turn {
            return Err(GameError::NotYourTurn(connection_id, game_id.clone()));
        }

        session.moves.push(mv.clone());
        session.set_clock_ms(color, time_left_ms);
        session.turn = color.opposite();

        tracing::debug!(
            %game_id,
            %color,
            from = %mv.from,
            to = %mv.to,
            ply = session.moves.len(),
            "move applied"
        );

        let mut applied = MoveApplied {
            game_id: game_id.clone(),
            mv,
            turn: session.turn,
            white_time: session.clock_ms(Color::White),
            black_time: session.clock_ms(Color::Black),
            participants: session.participants(),
            ended: None,
        };

        if let Some(ReportedOutcome { result, reason }) = outcome {
            session.finish(result);
            let participants = applied.participants;
            applied.ended = Some(self.close(game_id, participants, result, reason));
        }

        Ok(applied)
    }

    /// Ends the game with `connection_id` resigning. The opponent wins.
    ///
    /// # Errors
    /// [`GameError::NotFound`] or [`GameError::NotAParticipant`], as for
    /// [`apply_move`](Self::apply_move). Resigning is allowed on either
    /// side's turn.
    pub fn resign(
        &mut self,
        game_id: &GameId,
        connection_id: ConnectionId,
    ) -> Result<GameOver, GameError> {
        let session = self
            .store
            .get_mut(game_id)
            .ok_or_else(|| GameError::NotFound(game_id.clone()))?;

        let color = session
            .color_of(connection_id)
            .ok_or_else(|| GameError::NotAParticipant(connection_id, game_id.clone()))?;

        let result = GameResult::win_for(color.opposite());
        session.finish(result);
        let participants = session.participants();

        Ok(self.close(game_id, participants, result, EndReason::Resignation))
    }

    /// Tears down every session `connection_id` takes part in.
    ///
    /// Returns one entry per removed session naming the opponent to
    /// notify. A connection without a game yields an empty list.
    pub fn disconnect_cleanup(&mut self, connection_id: ConnectionId) -> Vec<AffectedSession> {
        let game_ids = self.store.scan_games_of(connection_id);
        if let Some(indexed) = self.store.game_of(connection_id).cloned() {
            if !game_ids.contains(&indexed) {
                tracing::warn!(
                    %connection_id,
                    game_id = %indexed,
                    "game index points at a missing session"
                );
                self.store.unindex(connection_id);
            }
        }

        game_ids
            .into_iter()
            .filter_map(|game_id| {
                let session = self.store.remove(&game_id)?;
                let notify = session.opponent_of(connection_id)?.connection_id;
                tracing::info!(
                    %game_id,
                    %connection_id,
                    opponent = %notify,
                    "game abandoned by disconnect"
                );
                Some(AffectedSession { game_id, notify })
            })
            .collect()
    }

    /// Removes a finished session and packages its result.
    fn close(
        &mut self,
        game_id: &GameId,
        participants: [ConnectionId; 2],
        result: GameResult,
        reason: EndReason,
    ) -> GameOver {
        self.store.remove(game_id);
        tracing::info!(%game_id, %result, ?reason, "game ended");

        GameOver {
            game_id: game_id.clone(),
            result,
            winner: result.winner(),
            reason,
            participants,
        }
    }
}
