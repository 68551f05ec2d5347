//! Room lifecycle management for Lycan.
//!
//! Each room runs as an isolated Tokio task (actor model) that exclusively
//! owns one [`Game`](lycan_engine::Game). Every mutation goes through the
//! room's command channel, so resolutions never interleave with other
//! submissions.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`ClientCommand`] / [`ServerEvent`]: what players send and receive
//! - [`RoomConfig`]: room settings (player limit, channel size, engine)

mod config;
mod error;
mod manager;
mod messages;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::{RoomManager, joinable_rooms};
pub use messages::{ClientCommand, CommandReply, ServerEvent};
pub use room::{Departure, PlayerSender, RoomHandle, RoomInfo};
