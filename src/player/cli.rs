#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};

use crate::cli::{coord_to_string, parse_coord, print_match};
use crate::core::{PlayerColor, Position, BOARD_SIZE};
use rand::rngs::SmallRng;

use super::{GameView, Player};

/// Player that reads moves from a line-oriented input, stdin by default.
pub struct CliPlayer<R = io::BufReader<io::Stdin>> {
    input: R,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self {
            input: io::BufReader::new(io::stdin()),
        }
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead + Send> CliPlayer<R> {
    pub fn with_input(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead + Send> Player for CliPlayer<R> {
    fn select_move(&mut self, _rng: &mut SmallRng, view: &GameView, me: PlayerColor) -> Option<Position> {
        let reachable = view.legal_moves(me);
        if reachable.is_empty() {
            return None;
        }
        print_match(view, &reachable);
        let options: Vec<String> = reachable.iter().map(|p| coord_to_string(*p)).collect();
        println!("\n{} to move. Reachable: {}", me, options.join(" "));

        loop {
            print!("Enter square (e.g., {}): ", options[0]);
            let _ = io::stdout().flush();
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match parse_coord(&line, BOARD_SIZE) {
                Ok(pos) if view.is_legal_move(me, pos) => return Some(pos),
                Ok(pos) => println!("✗ {} is not reachable", coord_to_string(pos)),
                Err(e) => println!("✗ {}", e),
            }
        }
    }
}
