use core::fmt;
use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{ROOM_CODE_ALPHABET, ROOM_CODE_LEN};

/// Five-character room identifier, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalize user input: trim, upper-case, and require exactly
    /// `ROOM_CODE_LEN` ASCII letters or digits.
    pub fn parse(input: &str) -> Option<RoomCode> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() == ROOM_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(RoomCode(code))
        } else {
            None
        }
    }

    /// Draw a random code from the room-code alphabet.
    pub fn random<R: Rng>(rng: &mut R) -> RoomCode {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        RoomCode(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomCode::parse(s).ok_or_else(super::room_code_hint)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
