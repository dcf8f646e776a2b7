//! Messages exchanged between clients and the relay.
//!
//! Each message is one JSON object with a snake_case `type` discriminator and
//! camelCase fields, e.g. `{"type":"move","roomCode":"QX7PA","row":2,"col":2,"player":"blue"}`.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{PlayerColor, MAX_NAME_LEN, ROOM_CODE_LEN};

pub mod room_code;
pub use room_code::RoomCode;

/// Messages exchanged between clients and the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Message {
    /// Ask the relay for a new room; the sender becomes blue.
    CreateRoom { player_name: String },
    /// The relay allocated `room_code` for the creator.
    RoomCreated { room_code: RoomCode },
    /// Take the second seat of an existing room as black.
    JoinRoom { room_code: String, player_name: String },
    /// Sent to the joiner: the match starts now.
    RoomJoined { room_code: RoomCode, blue_name: String },
    /// Sent to the creator: black has joined, the match starts now.
    PlayerJoined { player_name: String },
    /// A move, forwarded verbatim to the other seat.
    Move {
        room_code: RoomCode,
        row: u8,
        col: u8,
        player: PlayerColor,
    },
    /// Winner announcement, forwarded verbatim to the other seat.
    GameOver { room_code: RoomCode, winner: PlayerColor },
    /// Explicit exit from a room; the connection stays open.
    LeaveRoom { room_code: RoomCode },
    /// A request was rejected.
    Error { message: String },
    /// The room was closed after a period of inactivity.
    RoomExpired,
    /// The other seat left or dropped.
    PlayerDisconnected,
}

impl Message {
    pub fn error(message: impl Into<String>) -> Self {
        Message::Error {
            message: message.into(),
        }
    }

    /// Short name of the message kind, as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::CreateRoom { .. } => "create_room",
            Message::RoomCreated { .. } => "room_created",
            Message::JoinRoom { .. } => "join_room",
            Message::RoomJoined { .. } => "room_joined",
            Message::PlayerJoined { .. } => "player_joined",
            Message::Move { .. } => "move",
            Message::GameOver { .. } => "game_over",
            Message::LeaveRoom { .. } => "leave_room",
            Message::Error { .. } => "error",
            Message::RoomExpired => "room_expired",
            Message::PlayerDisconnected => "player_disconnected",
        }
    }

    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedMessage> {
        serde_json::from_slice(bytes).map_err(|e| MalformedMessage {
            reason: e.to_string(),
        })
    }
}

/// A frame arrived intact but its body is not a valid message. The stream is
/// still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMessage {
    pub reason: String,
}

impl fmt::Display for MalformedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed message: {}", self.reason)
    }
}

impl std::error::Error for MalformedMessage {}

/// Trim a player name and check its length.
pub fn validate_player_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Please enter your name".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }
    Ok(name.to_string())
}

/// Human-readable format hint for room codes.
pub fn room_code_hint() -> String {
    format!("Room codes are {} letters or digits", ROOM_CODE_LEN)
}
