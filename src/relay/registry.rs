//! Room bookkeeping for the relay, free of I/O.
//!
//! Every entry point takes the inbound event plus the current instant and
//! returns the messages to deliver, so the server task only has to route them.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::{Duration, Instant};

use crate::core::PlayerColor;
use crate::protocol::{room_code_hint, validate_player_name, Message, RoomCode};

/// Relay-assigned connection identifier.
pub type ConnId = u64;

/// Attempts at drawing an unused room code before giving up.
const MAX_CODE_ATTEMPTS: usize = 64;

/// A message to deliver to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnId,
    pub msg: Message,
}

impl Outbound {
    pub fn new(to: ConnId, msg: Message) -> Self {
        Self { to, msg }
    }
}

/// Externally visible state of an open room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Only the host's seat is taken.
    Waiting,
    /// Both seats are taken.
    Active,
}

#[derive(Debug)]
struct Seat {
    conn: ConnId,
    name: String,
}

#[derive(Debug)]
struct Room {
    blue: Seat,
    black: Option<Seat>,
    /// Color expected to send the next `move`.
    next_mover: PlayerColor,
    finished: bool,
    last_activity: Instant,
}

impl Room {
    fn seat_conn(&self, color: PlayerColor) -> Option<ConnId> {
        match color {
            PlayerColor::Blue => Some(self.blue.conn),
            PlayerColor::Black => self.black.as_ref().map(|s| s.conn),
        }
    }

    fn members(&self) -> impl Iterator<Item = ConnId> + '_ {
        core::iter::once(self.blue.conn).chain(self.black.as_ref().map(|s| s.conn))
    }
}

/// All open rooms, keyed by code, plus the seat each connection holds.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    seats: HashMap<ConnId, (RoomCode, PlayerColor)>,
    rng: SmallRng,
}

impl RoomRegistry {
    pub fn new() -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(SmallRng::from_rng(&mut seed_rng))
    }

    /// Registry drawing room codes from `rng`.
    pub fn with_rng(rng: SmallRng) -> Self {
        Self {
            rooms: HashMap::new(),
            seats: HashMap::new(),
            rng,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_status(&self, code: &RoomCode) -> Option<RoomStatus> {
        self.rooms.get(code).map(|room| match room.black {
            Some(_) => RoomStatus::Active,
            None => RoomStatus::Waiting,
        })
    }

    /// The room and color `conn` is seated as, if any.
    pub fn seat_of(&self, conn: ConnId) -> Option<(&RoomCode, PlayerColor)> {
        self.seats.get(&conn).map(|(code, color)| (code, *color))
    }

    /// Process one inbound message from `from`.
    pub fn handle(&mut self, from: ConnId, msg: Message, now: Instant) -> Vec<Outbound> {
        let result = match msg {
            Message::CreateRoom { player_name } => self.create_room(from, &player_name, now),
            Message::JoinRoom {
                room_code,
                player_name,
            } => self.join_room(from, &room_code, &player_name, now),
            Message::Move {
                ref room_code,
                player,
                ..
            } => {
                let code = room_code.clone();
                self.forward_move(from, &code, player, msg, now)
            }
            Message::GameOver { ref room_code, .. } => {
                let code = room_code.clone();
                self.forward_game_over(from, &code, msg, now)
            }
            Message::LeaveRoom { room_code } => self.leave_room(from, &room_code),
            other => Err(format!("Unexpected message: {}", other.kind())),
        };
        result.unwrap_or_else(|reason| vec![Outbound::new(from, Message::error(reason))])
    }

    fn create_room(&mut self, from: ConnId, name: &str, now: Instant) -> Result<Vec<Outbound>, String> {
        let name = validate_player_name(name)?;
        if self.seats.contains_key(&from) {
            return Err("You are already in a room".to_string());
        }
        let code = self.allocate_code()?;
        self.rooms.insert(
            code.clone(),
            Room {
                blue: Seat { conn: from, name },
                black: None,
                next_mover: PlayerColor::Blue,
                finished: false,
                last_activity: now,
            },
        );
        self.seats.insert(from, (code.clone(), PlayerColor::Blue));
        log::info!("[Relay] room {} created by connection {}", code, from);
        Ok(vec![Outbound::new(from, Message::RoomCreated { room_code: code })])
    }

    fn allocate_code(&mut self) -> Result<RoomCode, String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = RoomCode::random(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err("Could not allocate a room code, try again".to_string())
    }

    fn join_room(
        &mut self,
        from: ConnId,
        raw_code: &str,
        name: &str,
        now: Instant,
    ) -> Result<Vec<Outbound>, String> {
        let name = validate_player_name(name)?;
        let code = RoomCode::parse(raw_code).ok_or_else(room_code_hint)?;
        if self.seats.contains_key(&from) {
            return Err("You are already in a room".to_string());
        }
        let room = self.rooms.get_mut(&code).ok_or("Room not found")?;
        if room.black.is_some() {
            return Err("Room is full".to_string());
        }
        room.black = Some(Seat {
            conn: from,
            name: name.clone(),
        });
        room.last_activity = now;
        let host = room.blue.conn;
        let blue_name = room.blue.name.clone();
        self.seats.insert(from, (code.clone(), PlayerColor::Black));
        log::info!("[Relay] connection {} joined room {}", from, code);
        Ok(vec![
            Outbound::new(
                from,
                Message::RoomJoined {
                    room_code: code,
                    blue_name,
                },
            ),
            Outbound::new(host, Message::PlayerJoined { player_name: name }),
        ])
    }

    /// Seat check shared by `move` and `game_over`: `from` must sit in the
    /// active room `code`. Returns the other seat's connection and the
    /// sender's color.
    fn active_seat(&self, from: ConnId, code: &RoomCode) -> Result<(ConnId, PlayerColor), String> {
        let room = self.rooms.get(code).ok_or("Room not found")?;
        let color = match self.seats.get(&from) {
            Some((seated, color)) if seated == code => *color,
            _ => return Err("You are not in this room".to_string()),
        };
        let other = room
            .seat_conn(color.opponent())
            .ok_or("Waiting for an opponent")?;
        Ok((other, color))
    }

    fn forward_move(
        &mut self,
        from: ConnId,
        code: &RoomCode,
        player: PlayerColor,
        msg: Message,
        now: Instant,
    ) -> Result<Vec<Outbound>, String> {
        let (other, color) = self.active_seat(from, code)?;
        let room = self.rooms.get_mut(code).ok_or("Room not found")?;
        if room.finished {
            return Err("The match is over".to_string());
        }
        if player != color {
            return Err(format!("You are playing {}, not {}", color, player));
        }
        if player != room.next_mover {
            return Err(format!("It is {}'s turn", room.next_mover));
        }
        room.next_mover = player.opponent();
        room.last_activity = now;
        Ok(vec![Outbound::new(other, msg)])
    }

    fn forward_game_over(
        &mut self,
        from: ConnId,
        code: &RoomCode,
        msg: Message,
        now: Instant,
    ) -> Result<Vec<Outbound>, String> {
        let (other, _) = self.active_seat(from, code)?;
        let room = self.rooms.get_mut(code).ok_or("Room not found")?;
        room.finished = true;
        room.last_activity = now;
        log::info!("[Relay] match in room {} is over", code);
        Ok(vec![Outbound::new(other, msg)])
    }

    fn leave_room(&mut self, from: ConnId, code: &RoomCode) -> Result<Vec<Outbound>, String> {
        match self.seats.get(&from) {
            Some((seated, _)) if seated == code => Ok(self.close_room_of(from)),
            _ => Err("You are not in this room".to_string()),
        }
    }

    /// The connection is gone; close whatever room it sat in.
    pub fn disconnect(&mut self, conn: ConnId) -> Vec<Outbound> {
        self.close_room_of(conn)
    }

    fn close_room_of(&mut self, conn: ConnId) -> Vec<Outbound> {
        let Some((code, _)) = self.seats.remove(&conn) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.remove(&code) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for member in room.members().filter(|m| *m != conn) {
            self.seats.remove(&member);
            out.push(Outbound::new(member, Message::PlayerDisconnected));
        }
        log::info!("[Relay] room {} closed, connection {} left", code, conn);
        out
    }

    /// Close every room idle for longer than `timeout` and notify its members.
    pub fn expire_idle(&mut self, now: Instant, timeout: Duration) -> Vec<Outbound> {
        let expired: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, room)| now.saturating_duration_since(room.last_activity) >= timeout)
            .map(|(code, _)| code.clone())
            .collect();

        let mut out = Vec::new();
        for code in expired {
            if let Some(room) = self.rooms.remove(&code) {
                for member in room.members() {
                    self.seats.remove(&member);
                    out.push(Outbound::new(member, Message::RoomExpired));
                }
                log::info!("[Relay] room {} expired", code);
            }
        }
        out
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
