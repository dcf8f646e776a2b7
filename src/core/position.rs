//! Board coordinates and the eight compass directions.

use core::fmt;

/// A square on the board, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether this position lies on an `n × n` board.
    pub fn in_bounds(&self, n: usize) -> bool {
        (self.row as usize) < n && (self.col as usize) < n
    }

    /// Step `distance` squares in `dir`, or `None` when that leaves an `n × n` board.
    pub fn offset(&self, dir: Direction, distance: u8, n: usize) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let r = self.row as i16 + dr as i16 * distance as i16;
        let c = self.col as i16 + dc as i16 * distance as i16;
        if r < 0 || c < 0 || r as usize >= n || c as usize >= n {
            return None;
        }
        Some(Position::new(r as u8, c as u8))
    }

    /// Max of the absolute row and column deltas.
    pub fn chebyshev_distance(&self, other: Position) -> u8 {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr.max(dc)
    }

    /// Direction and distance of a straight-line displacement to `to`.
    ///
    /// Returns `None` for the null move and for displacements that are
    /// neither orthogonal nor diagonal.
    pub fn compass_to(&self, to: Position) -> Option<(Direction, u8)> {
        let dr = to.row as i16 - self.row as i16;
        let dc = to.col as i16 - self.col as i16;
        if dr == 0 && dc == 0 {
            return None;
        }
        if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
            return None;
        }
        let dir = Direction::from_delta(dr.signum() as i8, dc.signum() as i8)?;
        Some((dir, dr.abs().max(dc.abs()) as u8))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four orthogonal or four diagonal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Enumeration order used by move generation.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// (row, col) unit step.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownLeft => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }

    fn from_delta(dr: i8, dc: i8) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dr, dc))
    }
}
