//! Integration tests for session coordination.

use gambit_game::{AffectedSession, Coordinator, GameError};
use gambit_lobby::PlayerIdentity;
use gambit_protocol::{
    Color, ConnectionId, EndReason, GameId, GameResult, Move, PlayerProfile,
    ReportedOutcome, TimeControl,
};

// =========================================================================
// Helpers
// =========================================================================

const WHITE: ConnectionId = ConnectionId::new(1);
const BLACK: ConnectionId = ConnectionId::new(2);
const STRANGER: ConnectionId = ConnectionId::new(3);

fn identity(conn: ConnectionId, name: &str) -> PlayerIdentity {
    PlayerIdentity::new(conn, PlayerProfile::named(name))
}

/// A coordinator with one 5+0 game between WHITE and BLACK.
fn started_game() -> (Coordinator, GameId) {
    let mut coordinator = Coordinator::new();
    let id = coordinator
        .create_session(
            identity(WHITE, "alice"),
            identity(BLACK, "bob"),
            TimeControl::new(300, 0),
        )
        .unwrap()
        .id
        .clone();
    (coordinator, id)
}

fn e2e4() -> Move {
    Move::new("e2", "e4")
}

// =========================================================================
// apply_move()
// =========================================================================

#[test]
fn test_apply_move_flips_turn_and_sets_only_movers_clock() {
    let (mut coordinator, id) = started_game();

    let applied = coordinator
        .apply_move(&id, WHITE, e2e4(), 298_500, None)
        .unwrap();

    assert_eq!(applied.turn, Color::Black);
    assert_eq!(applied.white_time, 298_500);
    assert_eq!(applied.black_time, 300_000);
    assert_eq!(applied.participants, [WHITE, BLACK]);
    assert!(applied.ended.is_none());

    let session = coordinator.store().get(&id).unwrap();
    assert_eq!(session.moves, vec![e2e4()]);
    assert_eq!(session.turn, Color::Black);
    assert_eq!(session.clock_ms(Color::White), 298_500);
    assert_eq!(session.clock_ms(Color::Black), 300_000);
}

#[test]
fn test_apply_move_alternates_strictly() {
    let (mut coordinator, id) = started_game();

    coordinator.apply_move(&id, WHITE, e2e4(), 299_000, None).unwrap();
    let applied = coordinator
        .apply_move(&id, BLACK, Move::new("e7", "e5"), 297_000, None)
        .unwrap();

    assert_eq!(applied.turn, Color::White);
    assert_eq!(applied.white_time, 299_000);
    assert_eq!(applied.black_time, 297_000);
    assert_eq!(coordinator.store().get(&id).unwrap().moves.len(), 2);
}

#[test]
fn test_apply_move_out_of_turn_leaves_state_unchanged() {
    let (mut coordinator, id) = started_game();

    let result = coordinator.apply_move(&id, BLACK, Move::new("e7", "e5"), 1, None);

    assert!(matches!(result, Err(GameError::NotYourTurn(c, _)) if c == BLACK));
    let session = coordinator.store().get(&id).unwrap();
    assert!(session.moves.is_empty());
    assert_eq!(session.turn, Color::White);
    assert_eq!(session.clock_ms(Color::Black), 300_000);
}

#[test]
fn test_apply_move_unknown_game_returns_not_found() {
    let (mut coordinator, _) = started_game();

    let result = coordinator.apply_move(&GameId::new("game-0-0"), WHITE, e2e4(), 1, None);

    assert!(matches!(result, Err(GameError::NotFound(_))));
}

#[test]
fn test_apply_move_stranger_returns_not_a_participant() {
    let (mut coordinator, id) = started_game();

    let result = coordinator.apply_move(&id, STRANGER, e2e4(), 1, None);

    assert!(matches!(result, Err(GameError::NotAParticipant(c, _)) if c == STRANGER));
    assert!(coordinator.store().get(&id).unwrap().moves.is_empty());
}

#[test]
fn test_apply_move_preserves_move_metadata() {
    let (mut coordinator, id) = started_game();
    let mut mv = Move::new("e2", "e4");
    mv.extra.insert("san".into(), "e4".into());

    let applied = coordinator.apply_move(&id, WHITE, mv.clone(), 1, None).unwrap();

    assert_eq!(applied.mv, mv);
}

#[test]
fn test_apply_move_with_outcome_ends_and_removes_game() {
    let (mut coordinator, id) = started_game();
    let outcome = ReportedOutcome {
        result: GameResult::WhiteWins,
        reason: EndReason::Checkmate,
    };

    let applied = coordinator
        .apply_move(&id, WHITE, Move::new("h5", "f7"), 250_000, Some(outcome))
        .unwrap();

    let ended = applied.ended.expect("game should end");
    assert_eq!(ended.result, GameResult::WhiteWins);
    assert_eq!(ended.winner, Some(Color::White));
    assert_eq!(ended.reason, EndReason::Checkmate);
    assert_eq!(ended.participants, [WHITE, BLACK]);
    assert!(coordinator.store().get(&id).is_none());
    assert_eq!(coordinator.store().game_of(WHITE), None);
}

#[test]
fn test_apply_move_draw_outcome_has_no_winner() {
    let (mut coordinator, id) = started_game();
    let outcome = ReportedOutcome {
        result: GameResult::Draw,
        reason: EndReason::Stalemate,
    };

    let applied = coordinator.apply_move(&id, WHITE, e2e4(), 1, Some(outcome)).unwrap();

    assert_eq!(applied.ended.map(|e| e.winner), Some(None));
}

// =========================================================================
// resign()
// =========================================================================

#[test]
fn test_resign_white_gives_black_the_win() {
    let (mut coordinator, id) = started_game();

    let over = coordinator.resign(&id, WHITE).unwrap();

    assert_eq!(over.result, GameResult::BlackWins);
    assert_eq!(over.winner, Some(Color::Black));
    assert_eq!(over.reason, EndReason::Resignation);
    assert_eq!(over.participants, [WHITE, BLACK]);
}

#[test]
fn test_resign_black_on_whites_turn_is_allowed() {
    let (mut coordinator, id) = started_game();

    let over = coordinator.resign(&id, BLACK).unwrap();

    assert_eq!(over.result, GameResult::WhiteWins);
}

#[test]
fn test_resign_then_move_returns_not_found() {
    let (mut coordinator, id) = started_game();
    coordinator.resign(&id, WHITE).unwrap();

    let result = coordinator.apply_move(&id, WHITE, e2e4(), 1, None);

    assert!(matches!(result, Err(GameError::NotFound(_))));
    assert!(coordinator.store().is_empty());
}

#[test]
fn test_resign_stranger_returns_not_a_participant() {
    let (mut coordinator, id) = started_game();

    let result = coordinator.resign(&id, STRANGER);

    assert!(matches!(result, Err(GameError::NotAParticipant(..))));
    let session = coordinator.store().get(&id).unwrap();
    assert!(session.is_active());
}

// =========================================================================
// disconnect_cleanup()
// =========================================================================

#[test]
fn test_disconnect_cleanup_notifies_opponent_once() {
    let (mut coordinator, id) = started_game();

    let affected = coordinator.disconnect_cleanup(BLACK);

    assert_eq!(
        affected,
        vec![AffectedSession {
            game_id: id.clone(),
            notify: WHITE,
        }]
    );
    assert!(coordinator.store().get(&id).is_none());
    assert_eq!(coordinator.store().game_of(WHITE), None);
}

#[test]
fn test_disconnect_cleanup_without_game_is_empty() {
    let (mut coordinator, _) = started_game();

    assert!(coordinator.disconnect_cleanup(STRANGER).is_empty());
    assert_eq!(coordinator.store().len(), 1);
}

#[test]
fn test_disconnect_cleanup_leaves_other_games_alone() {
    let (mut coordinator, first) = started_game();
    let second = coordinator
        .create_session(
            identity(ConnectionId::new(10), "carol"),
            identity(ConnectionId::new(11), "dave"),
            TimeControl::new(60, 1),
        )
        .unwrap()
        .id
        .clone();

    coordinator.disconnect_cleanup(WHITE);

    assert!(coordinator.store().get(&first).is_none());
    assert!(coordinator.store().get(&second).is_some());
}

#[test]
fn test_create_session_after_game_ends_is_allowed() {
    let (mut coordinator, id) = started_game();
    coordinator.resign(&id, BLACK).unwrap();

    let rematch = coordinator.create_session(
        identity(BLACK, "bob"),
        identity(WHITE, "alice"),
        TimeControl::new(300, 0),
    );

    assert!(rematch.is_ok());
}
