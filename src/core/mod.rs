//! Core Territory game engine (no_std compatible)
//!
//! This module contains the pure game logic: the board model, the rules
//! engine and the match state machine. It only needs `alloc` and can be used
//! in embedded targets or compiled to WebAssembly.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod game;
pub mod position;
pub mod rules;

// Re-export commonly used types
pub use bitboard::{BitBoard, BitBoardError};
pub use board::{Board, StandardBoard};
pub use common::{BoardError, Cell, IllegalMove, MoveError, PlayerColor};
pub use config::*;
pub use game::{Match, MatchEvent, MatchPhase, MatchState, Move, MoveOutcome, StandardMatch};
pub use position::{Direction, Position};
pub use rules::{check_move, enumerate_legal_moves, is_legal_move, is_terminal, mobility};
