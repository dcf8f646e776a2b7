use crate::core::{mobility, PlayerColor, Position};
use rand::rngs::SmallRng;
use rand::Rng;

use super::{GameView, Player};

/// AI that looks one move ahead and maximizes its mobility lead.
///
/// A move that leaves the opponent stuck wins immediately and is always
/// taken. Ties are broken at random.
pub struct AiPlayer {
    /// Weight of the opponent's mobility relative to our own.
    aggression: usize,
}

impl AiPlayer {
    pub fn new() -> Self {
        Self { aggression: 2 }
    }

    pub fn with_aggression(aggression: usize) -> Self {
        Self { aggression }
    }

    fn score(&self, view: &GameView, me: PlayerColor, to: Position) -> Option<i64> {
        let (from, opponent) = view.perspective(me);
        let mut board = view.board;
        board.place_block(from, me).ok()?;
        let theirs = mobility(opponent, to, &board);
        if theirs == 0 {
            return Some(i64::MAX);
        }
        let ours = mobility(to, opponent, &board);
        Some(ours as i64 - (self.aggression * theirs) as i64)
    }
}

impl Default for AiPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for AiPlayer {
    fn select_move(&mut self, rng: &mut SmallRng, view: &GameView, me: PlayerColor) -> Option<Position> {
        let mut best: Option<i64> = None;
        let mut choices = alloc::vec::Vec::new();
        for to in view.legal_moves(me) {
            let Some(score) = self.score(view, me, to) else {
                continue;
            };
            match best {
                Some(b) if score < b => {}
                Some(b) if score == b => choices.push(to),
                _ => {
                    best = Some(score);
                    choices.clear();
                    choices.push(to);
                }
            }
        }
        if choices.is_empty() {
            return None;
        }
        Some(choices[rng.random_range(0..choices.len())])
    }
}
