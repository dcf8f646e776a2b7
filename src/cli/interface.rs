//! Terminal rendering of a match.

use std::fmt::Write as _;

use crate::core::{Cell, MatchState, PlayerColor, Position};

/// Column label for `col`: A, B, C, ...
pub fn column_label(col: u8) -> char {
    (b'A' + col) as char
}

/// Human-readable square name, e.g. `C4` for row 3, column 2.
pub fn coord_to_string(pos: Position) -> String {
    format!("{}{}", column_label(pos.col), pos.row + 1)
}

/// Parse a square name such as `c4` on an `n × n` board.
pub fn parse_coord(input: &str, n: usize) -> Result<Position, String> {
    let input = input.trim();
    if input.len() < 2 {
        return Err("Too short - need column letter and row number (e.g., C4)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars.next().ok_or("No column letter")?.to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("Invalid column '{}' - must be a letter", col_ch));
    }
    let col = (col_ch as u8).wrapping_sub(b'A') as usize;
    if col >= n {
        return Err(format!("Column '{}' out of bounds", col_ch));
    }
    let row_str: String = chars.collect();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("Invalid row '{}' - must be a number 1-{}", row_str, n))?;
    if row == 0 || row > n {
        return Err(format!("Row {} out of bounds - must be 1-{}", row, n));
    }
    Ok(Position::new((row - 1) as u8, col as u8))
}

/// Render the board. `B`/`K` mark the players, `b`/`k` their trails, `*`
/// the squares in `highlight`.
pub fn render_match<const N: usize>(state: &MatchState<N>, highlight: &[Position]) -> String {
    let mut out = String::new();
    let _ = write!(out, "    ");
    for c in 0..N {
        let _ = write!(out, " {}", column_label(c as u8));
    }
    let _ = writeln!(out);
    for r in 0..N {
        let _ = write!(out, " {:2} ", r + 1);
        for c in 0..N {
            let pos = Position::new(r as u8, c as u8);
            let ch = if pos == state.blue {
                'B'
            } else if pos == state.black {
                'K'
            } else if highlight.contains(&pos) {
                '*'
            } else {
                match state.board.occupant_trail(pos) {
                    Cell::Blocked(PlayerColor::Blue) => 'b',
                    Cell::Blocked(PlayerColor::Black) => 'k',
                    Cell::Empty => '.',
                }
            };
            let _ = write!(out, " {}", ch);
        }
        let _ = writeln!(out);
    }
    out
}

/// Print the board with a legend.
pub fn print_match<const N: usize>(state: &MatchState<N>, highlight: &[Position]) {
    println!("{}", render_match(state, highlight));
    println!("    Legend: B=Blue  K=Black  b/k=Blocked  *=Reachable  .=Open");
}
