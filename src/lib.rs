#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod core;
pub mod player;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod relay;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use crate::core::*;
pub use player::{AiPlayer, GameView, Player};

#[cfg(feature = "std")]
pub use cli::{coord_to_string, parse_coord, print_match, render_match};
#[cfg(feature = "std")]
pub use logging::{init_logging, log_level, LOG_ENV};
#[cfg(feature = "std")]
pub use node::{play_local, MatchReport, PlayerNode, Role};
#[cfg(feature = "std")]
pub use player::CliPlayer;
#[cfg(feature = "std")]
pub use protocol::{MalformedMessage, Message, RoomCode};
#[cfg(feature = "std")]
pub use relay::{Relay, RelayConfig};
#[cfg(feature = "std")]
pub use session::{OnlineMatch, PlayerNames, Session, SessionEvent, SessionLoss, SessionPhase};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport, TransportConfig};
