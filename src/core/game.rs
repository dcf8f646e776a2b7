use alloc::boxed::Box;
use alloc::vec::Vec;

use super::{
    board::Board,
    common::{MoveError, PlayerColor},
    config::{black_start, blue_start, BOARD_SIZE},
    position::Position,
    rules,
};

/// A single move: who moved and where to. The origin is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub mover: PlayerColor,
    pub to: Position,
}

/// Serializable snapshot of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchState<const N: usize> {
    pub board: Board<N>,
    pub blue: Position,
    pub black: Position,
    pub current_turn: PlayerColor,
    pub winner: Option<PlayerColor>,
}

impl<const N: usize> MatchState<N> {
    /// Fresh board with both players on their corners, blue to move.
    pub fn initial() -> Self {
        Self {
            board: Board::new(),
            blue: blue_start(),
            black: black_start(N),
            current_turn: PlayerColor::Blue,
            winner: None,
        }
    }

    pub fn position_of(&self, color: PlayerColor) -> Position {
        match color {
            PlayerColor::Blue => self.blue,
            PlayerColor::Black => self.black,
        }
    }

    /// `(mover's position, opponent's position)` for `mover`.
    pub fn perspective(&self, mover: PlayerColor) -> (Position, Position) {
        (self.position_of(mover), self.position_of(mover.opponent()))
    }

    /// Whether `mover` may move to `to` on this snapshot. Ignores turn order.
    pub fn is_legal_move(&self, mover: PlayerColor, to: Position) -> bool {
        let (from, opponent) = self.perspective(mover);
        rules::is_legal_move(&self.board, from, opponent, to)
    }

    /// Legal destinations for `color`.
    pub fn legal_moves(&self, color: PlayerColor) -> Vec<Position> {
        let (from, opponent) = self.perspective(color);
        rules::enumerate_legal_moves(from, opponent, &self.board)
    }

    /// Compact binary encoding used to compare peers byte for byte.
    #[cfg(feature = "std")]
    pub fn fingerprint(&self) -> Vec<u8> {
        // Plain-data struct with no maps or floats; encoding cannot fail.
        bincode::serialize(self).unwrap_or_default()
    }
}

impl<const N: usize> Default for MatchState<N> {
    fn default() -> Self {
        Self::initial()
    }
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    NotStarted,
    InProgress,
    Finished,
}

/// Notifications for the UI shell, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    BoardChanged {
        mover: PlayerColor,
        from: Position,
        to: Position,
    },
    TurnChanged(PlayerColor),
    MatchFinished { winner: PlayerColor },
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub events: Vec<MatchEvent>,
    pub winner: Option<PlayerColor>,
}

type Listener = Box<dyn FnMut(&MatchEvent) + Send>;

/// Turn order, move application and win detection for one match.
pub struct Match<const N: usize> {
    phase: MatchPhase,
    state: MatchState<N>,
    history: Vec<Move>,
    listeners: Vec<Listener>,
}

/// A match on the standard 9×9 board.
pub type StandardMatch = Match<BOARD_SIZE>;

impl<const N: usize> Match<N> {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::NotStarted,
            state: MatchState::initial(),
            history: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Reset to the initial position and begin play with blue to move.
    pub fn start(&mut self) {
        self.state = MatchState::initial();
        self.history.clear();
        self.phase = MatchPhase::InProgress;
        self.emit(MatchEvent::TurnChanged(PlayerColor::Blue));
    }

    /// Resume from a snapshot. The history starts empty.
    pub fn from_state(state: MatchState<N>) -> Self {
        let phase = match state.winner {
            Some(_) => MatchPhase::Finished,
            None => MatchPhase::InProgress,
        };
        Self {
            phase,
            state,
            history: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Start a match and apply `moves` in order.
    pub fn replay<I>(moves: I) -> Result<Self, MoveError>
    where
        I: IntoIterator<Item = Move>,
    {
        let mut m = Self::new();
        m.start();
        for mv in moves {
            m.apply_move(mv.mover, mv.to)?;
        }
        Ok(m)
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState<N> {
        &self.state
    }

    pub fn current_turn(&self) -> PlayerColor {
        self.state.current_turn
    }

    pub fn winner(&self) -> Option<PlayerColor> {
        self.state.winner
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Register a listener for board, turn and finish notifications.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply a move for `mover`. Nothing changes unless the move is legal and
    /// it is `mover`'s turn.
    pub fn apply_move(&mut self, mover: PlayerColor, to: Position) -> Result<MoveOutcome, MoveError> {
        if self.phase != MatchPhase::InProgress {
            return Err(MoveError::NotInProgress);
        }
        if mover != self.state.current_turn {
            return Err(MoveError::NotYourTurn {
                expected: self.state.current_turn,
                got: mover,
            });
        }
        let (from, opponent) = self.state.perspective(mover);
        rules::check_move(&self.state.board, from, opponent, to)?;

        self.state.board.place_block(from, mover)?;
        match mover {
            PlayerColor::Blue => self.state.blue = to,
            PlayerColor::Black => self.state.black = to,
        }
        let next = mover.opponent();
        self.state.current_turn = next;
        self.history.push(Move { mover, to });

        let mut events = Vec::with_capacity(3);
        events.push(MatchEvent::BoardChanged { mover, from, to });
        events.push(MatchEvent::TurnChanged(next));

        // The player now to move is the one who may be stuck.
        let (next_pos, next_opponent) = self.state.perspective(next);
        if rules::is_terminal(next_pos, next_opponent, &self.state.board) {
            self.state.winner = Some(mover);
            self.phase = MatchPhase::Finished;
            events.push(MatchEvent::MatchFinished { winner: mover });
        }

        for event in &events {
            self.emit(*event);
        }
        Ok(MoveOutcome {
            events,
            winner: self.state.winner,
        })
    }

    /// UI entry point: move the player whose turn it is. Returns whether the
    /// move was accepted.
    pub fn attempt_move(&mut self, to: Position) -> bool {
        let mover = self.state.current_turn;
        self.apply_move(mover, to).is_ok()
    }

    /// Accept a winner announced by the other peer without recomputing it.
    pub fn declare_winner(&mut self, winner: PlayerColor) -> Result<(), MoveError> {
        match (self.phase, self.state.winner) {
            (MatchPhase::Finished, Some(local)) if local == winner => Ok(()),
            (MatchPhase::Finished, Some(local)) => Err(MoveError::WinnerMismatch {
                local,
                announced: winner,
            }),
            (MatchPhase::InProgress, _) => {
                self.state.winner = Some(winner);
                self.phase = MatchPhase::Finished;
                self.emit(MatchEvent::MatchFinished { winner });
                Ok(())
            }
            _ => Err(MoveError::NotInProgress),
        }
    }

    fn emit(&mut self, event: MatchEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl<const N: usize> Default for Match<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for Match<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Match")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("moves", &self.history.len())
            .finish()
    }
}
