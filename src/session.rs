//! Client side of the room protocol.
//!
//! A [`Session`] owns the connection to the relay for as long as the player is
//! in online mode and keeps the local copy of the match in step with the
//! opponent's. Inbound moves go through the same match state machine as local
//! ones, so an illegal move from the other side is caught here and ends the
//! session.

use core::fmt;

use tokio::net::ToSocketAddrs;

use crate::core::{MatchEvent, MatchPhase, PlayerColor, Position, StandardMatch};
use crate::protocol::{validate_player_name, MalformedMessage, Message, RoomCode};
use crate::transport::{tcp::TcpTransport, Transport, TransportConfig};

/// Display names of both seats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerNames {
    pub blue: String,
    pub black: String,
}

impl PlayerNames {
    pub fn of(&self, color: PlayerColor) -> &str {
        match color {
            PlayerColor::Blue => &self.blue,
            PlayerColor::Black => &self.black,
        }
    }
}

/// A match being played through the relay.
#[derive(Debug)]
pub struct OnlineMatch {
    pub code: RoomCode,
    pub me: PlayerColor,
    pub names: PlayerNames,
    pub game: StandardMatch,
}

impl OnlineMatch {
    fn start(code: RoomCode, me: PlayerColor, names: PlayerNames) -> Self {
        let mut game = StandardMatch::new();
        game.start();
        Self {
            code,
            me,
            names,
            game,
        }
    }

    pub fn is_my_turn(&self) -> bool {
        self.game.phase() == MatchPhase::InProgress && self.game.current_turn() == self.me
    }
}

/// Where the session is in the room lifecycle.
#[derive(Debug)]
pub enum SessionPhase {
    /// In the menu; not in any room.
    Idle,
    /// `create_room` sent, waiting for the code.
    Creating,
    /// `join_room` sent for this code.
    Joining { code: RoomCode },
    /// Hosting `code`, waiting for an opponent.
    Waiting { code: RoomCode },
    Playing(Box<OnlineMatch>),
}

impl SessionPhase {
    fn room_code(&self) -> Option<&RoomCode> {
        match self {
            SessionPhase::Joining { code } | SessionPhase::Waiting { code } => Some(code),
            SessionPhase::Playing(m) => Some(&m.code),
            SessionPhase::Idle | SessionPhase::Creating => None,
        }
    }
}

/// A request the player walked away from before the relay answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Abandoned {
    /// `create_room` is in flight; the code is still unknown.
    Create,
    /// `join_room` then `leave_room` were sent for this code.
    Join(RoomCode),
    /// The join failed, so the relay also rejects the `leave_room`.
    Leave,
}

/// Why the current match was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLoss {
    RoomExpired,
    PeerDisconnected,
    ProtocolViolation(String),
    Transport(String),
}

impl fmt::Display for SessionLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionLoss::RoomExpired => write!(f, "Room expired due to inactivity"),
            SessionLoss::PeerDisconnected => write!(f, "Opponent disconnected"),
            SessionLoss::ProtocolViolation(reason) => write!(f, "Protocol violation: {}", reason),
            SessionLoss::Transport(reason) => write!(f, "Connection lost: {}", reason),
        }
    }
}

/// What the UI shell needs to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoomCreated { code: RoomCode },
    MatchStarted {
        code: RoomCode,
        me: PlayerColor,
        names: PlayerNames,
    },
    /// A change caused by the opponent's messages.
    Match(MatchEvent),
    /// The relay rejected a request; nothing changed.
    ServerError(String),
    /// The match is over for good; the session is back to `Idle`.
    SessionLost(SessionLoss),
}

pub struct Session {
    transport: Option<Box<dyn Transport>>,
    player_name: String,
    phase: SessionPhase,
    abandoned: Option<Abandoned>,
}

impl Session {
    /// Enter online mode over an open connection.
    pub fn new(transport: Box<dyn Transport>, player_name: &str) -> anyhow::Result<Self> {
        let player_name = validate_player_name(player_name).map_err(|e| anyhow::anyhow!(e))?;
        Ok(Self {
            transport: Some(transport),
            player_name,
            phase: SessionPhase::Idle,
            abandoned: None,
        })
    }

    /// Connect to a relay over TCP.
    pub async fn connect_tcp<A: ToSocketAddrs>(
        addr: A,
        player_name: &str,
        config: TransportConfig,
    ) -> anyhow::Result<Self> {
        let transport = TcpTransport::connect_with_config(addr, config)
            .await
            .map_err(|e| anyhow::anyhow!("Could not reach relay: {}", e))?;
        Self::new(Box::new(transport), player_name)
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn online_match(&self) -> Option<&OnlineMatch> {
        match &self.phase {
            SessionPhase::Playing(m) => Some(m),
            _ => None,
        }
    }

    pub fn online_match_mut(&mut self) -> Option<&mut OnlineMatch> {
        match &mut self.phase {
            SessionPhase::Playing(m) => Some(m),
            _ => None,
        }
    }

    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Session is closed"))?;
        if let Err(e) = transport.send(msg).await {
            log::warn!("[Session] send failed: {}", e);
            self.transport = None;
            self.phase = SessionPhase::Idle;
            return Err(e);
        }
        Ok(())
    }

    fn require_idle(&self) -> anyhow::Result<()> {
        match (&self.phase, &self.abandoned) {
            (SessionPhase::Idle, Some(Abandoned::Create)) => {
                Err(anyhow::anyhow!("Still leaving the previous room"))
            }
            (SessionPhase::Idle, _) => Ok(()),
            _ => Err(anyhow::anyhow!("Already in a room")),
        }
    }

    /// Ask the relay for a new room; this client will play blue.
    pub async fn create_room(&mut self) -> anyhow::Result<()> {
        self.require_idle()?;
        let player_name = self.player_name.clone();
        self.send(Message::CreateRoom { player_name }).await?;
        self.phase = SessionPhase::Creating;
        Ok(())
    }

    /// Join an existing room as black. The code is case-insensitive.
    pub async fn join_room(&mut self, code: &str) -> anyhow::Result<()> {
        self.require_idle()?;
        let code = RoomCode::parse(code)
            .ok_or_else(|| anyhow::anyhow!(crate::protocol::room_code_hint()))?;
        let player_name = self.player_name.clone();
        self.send(Message::JoinRoom {
            room_code: code.to_string(),
            player_name,
        })
        .await?;
        self.phase = SessionPhase::Joining { code };
        Ok(())
    }

    /// Play `to` for this client. Rejected moves are never sent. Returns
    /// whether the move was accepted.
    pub async fn attempt_move(&mut self, to: Position) -> anyhow::Result<bool> {
        let Some(online) = self.online_match_mut() else {
            return Ok(false);
        };
        if !online.is_my_turn() {
            return Ok(false);
        }
        let me = online.me;
        let outcome = match online.game.apply_move(me, to) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::debug!("[Session] rejected local move to {}: {}", to, e);
                return Ok(false);
            }
        };
        let code = online.code.clone();

        self.send(Message::Move {
            room_code: code.clone(),
            row: to.row,
            col: to.col,
            player: me,
        })
        .await?;
        if let Some(winner) = outcome.winner {
            self.send(Message::GameOver {
                room_code: code,
                winner,
            })
            .await?;
        }
        Ok(true)
    }

    /// Wait for the next message from the relay and apply it.
    pub async fn next_events(&mut self) -> anyhow::Result<Vec<SessionEvent>> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Session is closed"))?;
        match transport.recv().await {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                if let Some(bad) = e.downcast_ref::<MalformedMessage>() {
                    log::warn!("[Session] ignoring frame from relay: {}", bad);
                    return Ok(Vec::new());
                }
                log::warn!("[Session] connection lost: {}", e);
                self.transport = None;
                self.phase = SessionPhase::Idle;
                Ok(vec![SessionEvent::SessionLost(SessionLoss::Transport(
                    e.to_string(),
                ))])
            }
        }
    }

    /// Apply one message from the relay.
    pub async fn handle_message(&mut self, msg: Message) -> anyhow::Result<Vec<SessionEvent>> {
        let Some(msg) = self.absorb_abandoned(msg).await? else {
            return Ok(Vec::new());
        };
        let phase = core::mem::replace(&mut self.phase, SessionPhase::Idle);
        match (phase, msg) {
            (SessionPhase::Creating, Message::RoomCreated { room_code }) => {
                log::info!("[Session] room {} created, waiting for opponent", room_code);
                self.phase = SessionPhase::Waiting {
                    code: room_code.clone(),
                };
                Ok(vec![SessionEvent::RoomCreated { code: room_code }])
            }
            (SessionPhase::Idle, Message::RoomCreated { room_code })
            | (SessionPhase::Idle, Message::RoomJoined { room_code, .. }) => {
                log::warn!("[Session] seated in {} while idle, leaving", room_code);
                self.send(Message::LeaveRoom { room_code }).await?;
                Ok(Vec::new())
            }
            (SessionPhase::Joining { code }, Message::RoomJoined { room_code, blue_name }) => {
                if room_code != code {
                    log::warn!("[Session] joined {} but asked for {}", room_code, code);
                }
                let names = PlayerNames {
                    blue: blue_name,
                    black: self.player_name.clone(),
                };
                Ok(self.begin(room_code, PlayerColor::Black, names))
            }
            (SessionPhase::Waiting { code }, Message::PlayerJoined { player_name }) => {
                let names = PlayerNames {
                    blue: self.player_name.clone(),
                    black: player_name,
                };
                Ok(self.begin(code, PlayerColor::Blue, names))
            }
            (
                SessionPhase::Playing(mut online),
                Message::Move {
                    room_code,
                    row,
                    col,
                    player,
                },
            ) => {
                if room_code != online.code {
                    log::debug!("[Session] move tagged {} in room {}", room_code, online.code);
                }
                let to = Position::new(row, col);
                if player == online.me {
                    self.phase = SessionPhase::Playing(online);
                    return self
                        .violation(format!("opponent sent a move for {}", player))
                        .await;
                }
                match online.game.apply_move(player, to) {
                    Ok(outcome) => {
                        self.phase = SessionPhase::Playing(online);
                        Ok(outcome.events.into_iter().map(SessionEvent::Match).collect())
                    }
                    Err(e) => {
                        self.phase = SessionPhase::Playing(online);
                        self.violation(format!("{} move to {}: {}", player, to, e)).await
                    }
                }
            }
            (SessionPhase::Playing(mut online), Message::GameOver { room_code, winner }) => {
                if room_code != online.code {
                    log::debug!("[Session] game_over tagged {} in room {}", room_code, online.code);
                }
                let already = online.game.winner() == Some(winner);
                let result = online.game.declare_winner(winner);
                self.phase = SessionPhase::Playing(online);
                match result {
                    Ok(()) if already => Ok(Vec::new()),
                    Ok(()) => Ok(vec![SessionEvent::Match(MatchEvent::MatchFinished { winner })]),
                    Err(e) => self.violation(e.to_string()).await,
                }
            }
            (phase, Message::Error { message }) => {
                log::warn!("[Session] relay error: {}", message);
                // A failed create/join leaves us in the menu.
                self.phase = match phase {
                    SessionPhase::Creating | SessionPhase::Joining { .. } => SessionPhase::Idle,
                    other => other,
                };
                Ok(vec![SessionEvent::ServerError(message)])
            }
            (_, Message::RoomExpired) => Ok(self.lose(SessionLoss::RoomExpired)),
            (_, Message::PlayerDisconnected) => Ok(self.lose(SessionLoss::PeerDisconnected)),
            (phase, other) => {
                log::warn!("[Session] ignoring unexpected {} in {:?}", other.kind(), phase);
                self.phase = phase;
                Ok(Vec::new())
            }
        }
    }

    /// Replies to requests the player already walked away from. Returns the
    /// message back when it is not one of them.
    async fn absorb_abandoned(&mut self, msg: Message) -> anyhow::Result<Option<Message>> {
        let Some(abandoned) = self.abandoned.take() else {
            return Ok(Some(msg));
        };
        match (abandoned, msg) {
            (Abandoned::Create, Message::RoomCreated { room_code }) => {
                log::debug!("[Session] closing abandoned room {}", room_code);
                self.send(Message::LeaveRoom { room_code }).await?;
                Ok(None)
            }
            (Abandoned::Join(code), Message::RoomJoined { room_code, .. }) if room_code == code => {
                log::debug!("[Session] late room_joined for {} ignored", room_code);
                Ok(None)
            }
            (Abandoned::Create | Abandoned::Leave, Message::Error { message }) => {
                log::debug!("[Session] abandoned request failed: {}", message);
                Ok(None)
            }
            (Abandoned::Join(_), Message::Error { message }) => {
                log::debug!("[Session] abandoned join failed: {}", message);
                self.abandoned = Some(Abandoned::Leave);
                Ok(None)
            }
            (abandoned, msg) => {
                self.abandoned = Some(abandoned);
                Ok(Some(msg))
            }
        }
    }

    fn begin(&mut self, code: RoomCode, me: PlayerColor, names: PlayerNames) -> Vec<SessionEvent> {
        log::info!(
            "[Session] match in room {} started: {} (blue) vs {} (black), playing {}",
            code,
            names.blue,
            names.black,
            me
        );
        self.phase = SessionPhase::Playing(Box::new(OnlineMatch::start(
            code.clone(),
            me,
            names.clone(),
        )));
        vec![SessionEvent::MatchStarted { code, me, names }]
    }

    fn lose(&mut self, loss: SessionLoss) -> Vec<SessionEvent> {
        log::info!("[Session] {}", loss);
        self.phase = SessionPhase::Idle;
        vec![SessionEvent::SessionLost(loss)]
    }

    /// The opponent broke the rules: leave the room and report the loss.
    async fn violation(&mut self, reason: String) -> anyhow::Result<Vec<SessionEvent>> {
        log::warn!("[Session] protocol violation: {}", reason);
        if let Some(room_code) = self.phase.room_code().cloned() {
            self.phase = SessionPhase::Idle;
            if let Err(e) = self.send(Message::LeaveRoom { room_code }).await {
                log::debug!("[Session] could not announce leave: {}", e);
            }
        }
        Ok(self.lose(SessionLoss::ProtocolViolation(reason)))
    }

    /// Leave the current room, if any, and return to the menu. The
    /// connection stays open.
    pub async fn leave(&mut self) -> anyhow::Result<()> {
        let phase = core::mem::replace(&mut self.phase, SessionPhase::Idle);
        match phase {
            SessionPhase::Idle => {}
            SessionPhase::Creating => self.abandoned = Some(Abandoned::Create),
            SessionPhase::Joining { code } => {
                self.abandoned = Some(Abandoned::Join(code.clone()));
                self.send(Message::LeaveRoom { room_code: code }).await?;
            }
            SessionPhase::Waiting { code } => {
                self.send(Message::LeaveRoom { room_code: code }).await?;
            }
            SessionPhase::Playing(online) => {
                let room_code = online.code;
                self.send(Message::LeaveRoom { room_code }).await?;
            }
        }
        Ok(())
    }

    /// Leave online mode: leave any room and close the connection.
    pub async fn close(mut self) {
        if self.transport.is_some() {
            if let Err(e) = self.leave().await {
                log::debug!("[Session] leave on close failed: {}", e);
            }
        }
        self.transport = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("player_name", &self.player_name)
            .field("connected", &self.transport.is_some())
            .field("phase", &self.phase)
            .field("abandoned", &self.abandoned)
            .finish()
    }
}
