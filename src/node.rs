use rand::rngs::SmallRng;
use tokio::sync::oneshot;

use crate::{
    core::{MatchEvent, MatchPhase, PlayerColor, StandardMatch},
    player::Player,
    protocol::RoomCode,
    session::{PlayerNames, Session, SessionEvent},
};

/// How a node enters a room.
pub enum Role {
    /// Create a room. The code is sent on the channel once the relay assigns
    /// it, so a caller can hand it to the other player.
    Host(Option<oneshot::Sender<RoomCode>>),
    /// Join the room with this code.
    Join(String),
}

/// Result of a finished online match, from one client's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub code: RoomCode,
    pub me: PlayerColor,
    pub winner: PlayerColor,
    pub names: PlayerNames,
    pub moves: usize,
    pub fingerprint: Vec<u8>,
}

impl MatchReport {
    pub fn won(&self) -> bool {
        self.winner == self.me
    }
}

/// Drives a [`Player`] through one online match.
pub struct PlayerNode {
    player: Box<dyn Player>,
    session: Session,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, session: Session) -> Self {
        Self { player, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub async fn run(&mut self, rng: &mut SmallRng, role: Role) -> anyhow::Result<MatchReport> {
        let mut code_tx = match role {
            Role::Host(tx) => {
                self.session.create_room().await?;
                tx
            }
            Role::Join(code) => {
                self.session.join_room(&code).await?;
                None
            }
        };

        loop {
            if let Some(online) = self.session.online_match() {
                if online.game.phase() == MatchPhase::Finished {
                    let winner = online
                        .game
                        .winner()
                        .ok_or_else(|| anyhow::anyhow!("Finished match has no winner"))?;
                    log::info!("[Node] match over, {} wins", winner);
                    return Ok(MatchReport {
                        code: online.code.clone(),
                        me: online.me,
                        winner,
                        names: online.names.clone(),
                        moves: online.game.history().len(),
                        fingerprint: online.game.state().fingerprint(),
                    });
                }
                if online.is_my_turn() {
                    let me = online.me;
                    let view = *online.game.state();
                    let Some(to) = self.player.select_move(rng, &view, me) else {
                        self.session.leave().await?;
                        return Err(anyhow::anyhow!("Player gave up"));
                    };
                    if !self.session.attempt_move(to).await? {
                        return Err(anyhow::anyhow!("Player chose an illegal move: {}", to));
                    }
                    self.player.handle_move(me, to);
                    continue;
                }
            }

            for event in self.session.next_events().await? {
                match event {
                    SessionEvent::RoomCreated { code } => {
                        log::info!("[Node] hosting room {}", code);
                        if let Some(tx) = code_tx.take() {
                            // The receiver may have lost interest; the room is still open.
                            let _ = tx.send(code);
                        }
                    }
                    SessionEvent::MatchStarted { me, names, .. } => {
                        log::info!(
                            "[Node] playing {} as {}",
                            names.of(me.opponent()),
                            me
                        );
                    }
                    SessionEvent::Match(MatchEvent::BoardChanged { mover, to, .. }) => {
                        self.player.handle_move(mover, to);
                    }
                    SessionEvent::Match(_) => {}
                    SessionEvent::ServerError(message) => {
                        return Err(anyhow::anyhow!("Relay error: {}", message));
                    }
                    SessionEvent::SessionLost(loss) => {
                        return Err(anyhow::anyhow!("Session lost: {}", loss));
                    }
                }
            }
        }
    }
}

/// Play a hot-seat match between two players sharing one board.
pub fn play_local(
    blue: &mut dyn Player,
    black: &mut dyn Player,
    rng: &mut SmallRng,
) -> anyhow::Result<StandardMatch> {
    let mut game = StandardMatch::new();
    game.start();
    while game.phase() == MatchPhase::InProgress {
        let mover = game.current_turn();
        let view = *game.state();
        let choice = match mover {
            PlayerColor::Blue => blue.select_move(rng, &view, mover),
            PlayerColor::Black => black.select_move(rng, &view, mover),
        };
        let to = choice.ok_or_else(|| anyhow::anyhow!("{} gave up", mover))?;
        game.apply_move(mover, to)
            .map_err(|e| anyhow::anyhow!("{} move to {}: {}", mover, to, e))?;
        blue.handle_move(mover, to);
        black.handle_move(mover, to);
    }
    Ok(game)
}
