//! Board model: which squares have been vacated, and by whom.

use core::fmt;

use super::bitboard::BitBoard;
use super::common::{BoardError, Cell, PlayerColor};
use super::config::BOARD_SIZE;
use super::position::Position;

type BB<const N: usize> = BitBoard<u128, N>;

/// N×N grid of cell states. Cells only ever go from empty to blocked.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board<const N: usize> {
    blue_trail: BB<N>,
    black_trail: BB<N>,
}

/// The standard 9×9 board.
pub type StandardBoard = Board<BOARD_SIZE>;

impl<const N: usize> Board<N> {
    const SIZE_OK: () = assert!(N >= 2 && N * N <= 128, "board side must be in 2..=11");

    /// Create a board with every square empty.
    pub fn new() -> Self {
        let () = Self::SIZE_OK;
        Board {
            blue_trail: BB::new(),
            black_trail: BB::new(),
        }
    }

    /// Side length.
    pub const fn size(&self) -> usize {
        N
    }

    /// The blocking color of `pos`, or `Cell::Empty`. Off-board squares read as empty;
    /// callers check bounds first.
    pub fn occupant_trail(&self, pos: Position) -> Cell {
        if self.blue_trail.contains(pos).unwrap_or(false) {
            Cell::Blocked(PlayerColor::Blue)
        } else if self.black_trail.contains(pos).unwrap_or(false) {
            Cell::Blocked(PlayerColor::Black)
        } else {
            Cell::Empty
        }
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        matches!(self.occupant_trail(pos), Cell::Empty)
    }

    /// Permanently block `pos` with `color`.
    pub fn place_block(&mut self, pos: Position, color: PlayerColor) -> Result<(), BoardError> {
        let taken = self.blue_trail | self.black_trail;
        if taken.contains(pos)? {
            return Err(BoardError::AlreadyBlocked(pos));
        }
        match color {
            PlayerColor::Blue => self.blue_trail.insert(pos)?,
            PlayerColor::Black => self.black_trail.insert(pos)?,
        }
        Ok(())
    }

    /// Number of blocked squares of either color.
    pub fn blocked_count(&self) -> usize {
        self.blue_trail.count_ones() + self.black_trail.count_ones()
    }

    /// Squares vacated by `color`, row-major.
    pub fn trail(&self, color: PlayerColor) -> impl Iterator<Item = Position> + '_ {
        match color {
            PlayerColor::Blue => self.blue_trail.iter(),
            PlayerColor::Black => self.black_trail.iter(),
        }
    }
}

impl<const N: usize> Default for Board<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Board<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board<{}> {{\n  blue_trail:\n{:?}  black_trail:\n{:?}}}",
            N, self.blue_trail, self.black_trail
        )
    }
}
