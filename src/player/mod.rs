//! Player trait and implementations
//!
//! This module defines the Player trait and provides concrete implementations:
//! - AiPlayer: one-ply mobility search
//! - CliPlayer: Interactive command-line player

use crate::core::{MatchState, PlayerColor, Position, BOARD_SIZE};
use rand::rngs::SmallRng;

/// Snapshot type players choose moves from.
pub type GameView = MatchState<BOARD_SIZE>;

/// Interface implemented by different player types.
pub trait Player: Send {
    /// Choose a destination for `me` on the given snapshot. `None` means the
    /// player gives up (no move available, or input closed).
    fn select_move(&mut self, rng: &mut SmallRng, view: &GameView, me: PlayerColor) -> Option<Position>;

    /// Inform the player of a move made by either side.
    fn handle_move(&mut self, _mover: PlayerColor, _to: Position) {}
}

pub mod ai;
pub use ai::AiPlayer;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
pub use cli::CliPlayer;
