//! Move legality, move generation and terminal detection.
//!
//! Everything here is a pure function of a board and two positions. The
//! match state machine and both online peers go through these same functions,
//! which is what keeps remote copies of a match in agreement.

use alloc::vec::Vec;

use super::board::Board;
use super::common::{Cell, IllegalMove};
use super::config::MAX_MOVE_DISTANCE;
use super::position::{Direction, Position};

/// Check a move from `from` to `to` with the opponent standing on `opponent`.
pub fn check_move<const N: usize>(
    board: &Board<N>,
    from: Position,
    opponent: Position,
    to: Position,
) -> Result<(), IllegalMove> {
    if !to.in_bounds(N) {
        return Err(IllegalMove::OutOfBounds);
    }
    if !board.is_empty(to) {
        return Err(IllegalMove::TargetBlocked);
    }
    if to == opponent {
        return Err(IllegalMove::OntoOpponent);
    }
    if to == from {
        return Err(IllegalMove::NullMove);
    }
    let (dir, distance) = from.compass_to(to).ok_or(IllegalMove::NotStraightLine)?;
    if distance > MAX_MOVE_DISTANCE {
        return Err(IllegalMove::TooFar { distance });
    }

    for step in 1..=distance {
        let sq = from
            .offset(dir, step, N)
            .ok_or(IllegalMove::OutOfBounds)?;
        if let Cell::Blocked(_) = board.occupant_trail(sq) {
            return Err(IllegalMove::PathBlocked(sq));
        }
        if step < distance && sq == opponent {
            return Err(IllegalMove::PathThroughOpponent);
        }
    }
    Ok(())
}

/// Whether moving from `from` to `to` is legal.
pub fn is_legal_move<const N: usize>(
    board: &Board<N>,
    from: Position,
    opponent: Position,
    to: Position,
) -> bool {
    check_move(board, from, opponent, to).is_ok()
}

/// All squares reachable from `position`, direction-major then nearest first.
///
/// A ray stops at the first square that is off the board, blocked, or held by
/// the opponent; nothing is ever jumped.
pub fn enumerate_legal_moves<const N: usize>(
    position: Position,
    opponent: Position,
    board: &Board<N>,
) -> Vec<Position> {
    let mut moves = Vec::new();
    for dir in Direction::ALL {
        for distance in 1..=MAX_MOVE_DISTANCE {
            let Some(sq) = position.offset(dir, distance, N) else {
                break;
            };
            if !board.is_empty(sq) || sq == opponent {
                break;
            }
            moves.push(sq);
        }
    }
    moves
}

/// Number of legal moves, without allocating.
pub fn mobility<const N: usize>(position: Position, opponent: Position, board: &Board<N>) -> usize {
    Direction::ALL
        .into_iter()
        .map(|dir| {
            (1..=MAX_MOVE_DISTANCE)
                .map_while(|d| position.offset(dir, d, N))
                .take_while(|sq| board.is_empty(*sq) && *sq != opponent)
                .count()
        })
        .sum()
}

/// True when the player standing on `player` has no legal move.
pub fn is_terminal<const N: usize>(
    player: Position,
    opponent: Position,
    board: &Board<N>,
) -> bool {
    enumerate_legal_moves(player, opponent, board).is_empty()
}
