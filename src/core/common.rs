//! Common types for Territory: player colors, cell states and errors.

use core::fmt;

use super::bitboard::BitBoardError;
use super::position::Position;

/// The two sides of a match. Blue always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum PlayerColor {
    Blue,
    Black,
}

impl PlayerColor {
    pub const fn opponent(self) -> PlayerColor {
        match self {
            PlayerColor::Blue => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::Blue,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PlayerColor::Blue => "blue",
            PlayerColor::Black => "black",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    /// Permanently removed from play, tagged with the color that vacated it.
    Blocked(PlayerColor),
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error (e.g., invalid size or index).
    BitBoardError(BitBoardError),
    /// Attempted to block a square that is already blocked.
    AlreadyBlocked(Position),
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoardError(err)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            BoardError::AlreadyBlocked(pos) => write!(f, "Square {} is already blocked", pos),
        }
    }
}

/// Why a displacement is not a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    OutOfBounds,
    TargetBlocked,
    OntoOpponent,
    NullMove,
    NotStraightLine,
    TooFar { distance: u8 },
    PathBlocked(Position),
    PathThroughOpponent,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::OutOfBounds => write!(f, "target is off the board"),
            IllegalMove::TargetBlocked => write!(f, "target square is blocked"),
            IllegalMove::OntoOpponent => write!(f, "cannot land on the opponent"),
            IllegalMove::NullMove => write!(f, "must move to a different square"),
            IllegalMove::NotStraightLine => {
                write!(f, "move must be orthogonal or diagonal")
            }
            IllegalMove::TooFar { distance } => {
                write!(f, "move of {} squares exceeds the maximum", distance)
            }
            IllegalMove::PathBlocked(pos) => write!(f, "path is blocked at {}", pos),
            IllegalMove::PathThroughOpponent => write!(f, "path crosses the opponent"),
        }
    }
}

/// Errors returned by the match state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The match has not started or is already finished.
    NotInProgress,
    /// A player tried to move out of turn.
    NotYourTurn { expected: PlayerColor, got: PlayerColor },
    /// The displacement failed the rules check.
    Illegal(IllegalMove),
    /// A winner announcement contradicts the locally computed result.
    WinnerMismatch { local: PlayerColor, announced: PlayerColor },
    Board(BoardError),
}

impl From<IllegalMove> for MoveError {
    fn from(err: IllegalMove) -> Self {
        MoveError::Illegal(err)
    }
}

impl From<BoardError> for MoveError {
    fn from(err: BoardError) -> Self {
        MoveError::Board(err)
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::NotInProgress => write!(f, "Match is not in progress"),
            MoveError::NotYourTurn { expected, got } => {
                write!(f, "It is {}'s turn, not {}'s", expected, got)
            }
            MoveError::Illegal(reason) => write!(f, "Illegal move: {}", reason),
            MoveError::WinnerMismatch { local, announced } => write!(
                f,
                "Announced winner {} disagrees with local winner {}",
                announced, local
            ),
            MoveError::Board(e) => write!(f, "Board error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
#[cfg(feature = "std")]
impl std::error::Error for IllegalMove {}
#[cfg(feature = "std")]
impl std::error::Error for MoveError {}
