use super::position::Position;

/// Side length of the standard board.
pub const BOARD_SIZE: usize = 9;

/// Longest straight-line move, in squares.
pub const MAX_MOVE_DISTANCE: u8 = 2;

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 5;

/// Characters the relay draws room codes from. No 0/O or 1/I.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 10;

/// Blue's starting square.
pub const fn blue_start() -> Position {
    Position::new(0, 0)
}

/// Black's starting square on an `n × n` board.
pub const fn black_start(n: usize) -> Position {
    Position::new((n - 1) as u8, (n - 1) as u8)
}
