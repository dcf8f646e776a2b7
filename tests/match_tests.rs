use std::sync::{Arc, Mutex};

use territory::{
    IllegalMove, Match, MatchEvent, MatchPhase, MatchState, Move, MoveError, PlayerColor, Position,
    StandardBoard, StandardMatch,
};

fn p(row: u8, col: u8) -> Position {
    Position::new(row, col)
}

fn started() -> StandardMatch {
    let mut game = StandardMatch::new();
    game.start();
    game
}

#[test]
fn test_new_match_waits_for_start() {
    let mut game = StandardMatch::new();
    assert_eq!(game.phase(), MatchPhase::NotStarted);
    assert_eq!(
        game.apply_move(PlayerColor::Blue, p(1, 1)),
        Err(MoveError::NotInProgress)
    );
    game.start();
    assert_eq!(game.phase(), MatchPhase::InProgress);
    assert_eq!(game.current_turn(), PlayerColor::Blue);
    assert_eq!(game.state().blue, p(0, 0));
    assert_eq!(game.state().black, p(8, 8));
}

#[test]
fn test_apply_move_updates_state_and_events() {
    let mut game = started();
    let outcome = game.apply_move(PlayerColor::Blue, p(2, 2)).unwrap();
    assert_eq!(
        outcome.events,
        vec![
            MatchEvent::BoardChanged {
                mover: PlayerColor::Blue,
                from: p(0, 0),
                to: p(2, 2),
            },
            MatchEvent::TurnChanged(PlayerColor::Black),
        ]
    );
    assert_eq!(outcome.winner, None);
    assert_eq!(game.state().blue, p(2, 2));
    assert!(!game.state().board.is_empty(p(0, 0)));
    assert_eq!(game.current_turn(), PlayerColor::Black);
    assert_eq!(
        game.history(),
        &[Move {
            mover: PlayerColor::Blue,
            to: p(2, 2)
        }]
    );
}

#[test]
fn test_rejected_move_changes_nothing() {
    let mut game = started();
    let before = *game.state();
    assert_eq!(
        game.apply_move(PlayerColor::Blue, p(3, 3)),
        Err(MoveError::Illegal(IllegalMove::TooFar { distance: 3 }))
    );
    assert_eq!(
        game.apply_move(PlayerColor::Black, p(7, 7)),
        Err(MoveError::NotYourTurn {
            expected: PlayerColor::Blue,
            got: PlayerColor::Black,
        })
    );
    assert!(!game.attempt_move(p(0, 0)));
    assert_eq!(game.state(), &before);
    assert!(game.history().is_empty());
}

#[test]
fn test_attempt_move_plays_current_turn() {
    let mut game = started();
    assert!(game.attempt_move(p(1, 1)));
    assert!(game.attempt_move(p(7, 7)));
    assert_eq!(game.state().blue, p(1, 1));
    assert_eq!(game.state().black, p(7, 7));
    assert_eq!(game.current_turn(), PlayerColor::Blue);
}

#[test]
fn test_vacated_square_cannot_be_reentered() {
    let mut game = started();
    assert!(game.attempt_move(p(1, 0)));
    assert!(game.attempt_move(p(7, 8)));
    assert_eq!(
        game.apply_move(PlayerColor::Blue, p(0, 0)),
        Err(MoveError::Illegal(IllegalMove::TargetBlocked))
    );
}

/// Black cornered on (8,8) with (7,7) and (8,7) blocked; blue two squares
/// above the last exit.
fn cornered_black() -> StandardMatch {
    let mut board = StandardBoard::new();
    board.place_block(p(7, 7), PlayerColor::Black).unwrap();
    board.place_block(p(8, 7), PlayerColor::Black).unwrap();
    StandardMatch::from_state(MatchState {
        board,
        blue: p(5, 8),
        black: p(8, 8),
        current_turn: PlayerColor::Blue,
        winner: None,
    })
}

#[test]
fn test_sealing_the_last_exit_wins() {
    let mut game = cornered_black();
    assert_eq!(game.phase(), MatchPhase::InProgress);
    let outcome = game.apply_move(PlayerColor::Blue, p(7, 8)).unwrap();
    assert_eq!(outcome.winner, Some(PlayerColor::Blue));
    assert_eq!(
        outcome.events.last(),
        Some(&MatchEvent::MatchFinished {
            winner: PlayerColor::Blue
        })
    );
    assert_eq!(game.phase(), MatchPhase::Finished);
    assert_eq!(game.winner(), Some(PlayerColor::Blue));
    assert_eq!(
        game.apply_move(PlayerColor::Black, p(6, 8)),
        Err(MoveError::NotInProgress)
    );
}

#[test]
fn test_winner_is_checked_for_the_next_player_only() {
    // Blue boxes itself in while black still has room: play continues.
    let mut board = StandardBoard::new();
    board.place_block(p(0, 1), PlayerColor::Blue).unwrap();
    board.place_block(p(1, 1), PlayerColor::Blue).unwrap();
    board.place_block(p(2, 0), PlayerColor::Blue).unwrap();
    let mut game = StandardMatch::from_state(MatchState {
        board,
        blue: p(1, 0),
        black: p(8, 8),
        current_turn: PlayerColor::Blue,
        winner: None,
    });
    let outcome = game.apply_move(PlayerColor::Blue, p(0, 0)).unwrap();
    assert_eq!(outcome.winner, None);
    assert_eq!(game.phase(), MatchPhase::InProgress);
    assert!(game.state().legal_moves(PlayerColor::Blue).is_empty());
}

#[test]
fn test_listeners_see_events_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut game = cornered_black();
    let sink = Arc::clone(&seen);
    game.subscribe(move |e| sink.lock().unwrap().push(*e));
    game.apply_move(PlayerColor::Blue, p(7, 8)).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            MatchEvent::BoardChanged {
                mover: PlayerColor::Blue,
                from: p(5, 8),
                to: p(7, 8),
            },
            MatchEvent::TurnChanged(PlayerColor::Black),
            MatchEvent::MatchFinished {
                winner: PlayerColor::Blue
            },
        ]
    );
}

#[test]
fn test_start_emits_turn_changed() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut game = StandardMatch::new();
    let sink = Arc::clone(&seen);
    game.subscribe(move |e| sink.lock().unwrap().push(*e));
    game.start();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![MatchEvent::TurnChanged(PlayerColor::Blue)]
    );
}

#[test]
fn test_declare_winner() {
    let mut game = started();
    game.declare_winner(PlayerColor::Black).unwrap();
    assert_eq!(game.phase(), MatchPhase::Finished);
    assert_eq!(game.winner(), Some(PlayerColor::Black));
    // Repeating the same result is accepted.
    game.declare_winner(PlayerColor::Black).unwrap();

    let mut game = cornered_black();
    game.apply_move(PlayerColor::Blue, p(7, 8)).unwrap();
    assert_eq!(
        game.declare_winner(PlayerColor::Black),
        Err(MoveError::WinnerMismatch {
            local: PlayerColor::Blue,
            announced: PlayerColor::Black,
        })
    );
    assert_eq!(game.winner(), Some(PlayerColor::Blue));

    let mut fresh = StandardMatch::new();
    assert_eq!(
        fresh.declare_winner(PlayerColor::Blue),
        Err(MoveError::NotInProgress)
    );
}

#[test]
fn test_replay_rejects_illegal_history() {
    let moves = [
        Move {
            mover: PlayerColor::Blue,
            to: p(2, 2),
        },
        Move {
            mover: PlayerColor::Blue,
            to: p(3, 3),
        },
    ];
    assert!(matches!(
        StandardMatch::replay(moves),
        Err(MoveError::NotYourTurn { .. })
    ));
}

#[test]
fn test_small_board_match() {
    let mut game = Match::<3>::new();
    game.start();
    assert_eq!(game.state().black, p(2, 2));
    assert!(game.attempt_move(p(0, 2)));
    assert!(game.attempt_move(p(2, 0)));
    assert!(game.attempt_move(p(1, 1)));
    assert!(!game.state().board.is_empty(p(0, 2)));
}
