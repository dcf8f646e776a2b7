//! The relay: room registry and message forwarding between the two seats of
//! each room. It never runs the rules engine.

pub mod config;
pub mod registry;
pub mod server;

pub use config::RelayConfig;
pub use registry::{ConnId, Outbound, RoomRegistry, RoomStatus};
pub use server::Relay;
