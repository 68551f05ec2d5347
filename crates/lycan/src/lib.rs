//! # Lycan
//!
//! Server-authoritative Werewolf (Mafia) rooms.
//!
//! The game rules live in `lycan-engine`, one synchronous [`Game`] per
//! room. `lycan-room` wraps each game in a Tokio actor and routes events
//! to players. This crate adds the front door a transport plugs into:
//! [`Server`] turns encoded client frames into room operations and hands
//! back encoded replies, so a WebSocket or TCP layer only has to move
//! bytes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lycan::prelude::*;
//!
//! # async fn demo() -> Result<(), LycanError> {
//! let server = Server::new(RoomConfig::default(), JsonCodec);
//! let mut events = server.connect(ConnectionRef(1)).await;
//! let reply = server
//!     .handle_frame(ConnectionRef(1), br#"{"type":"create_room","name":"ana"}"#)
//!     .await?;
//! # let _ = (reply, events.try_recv());
//! # Ok(())
//! # }
//! ```

mod error;
mod frame;
mod server;

pub use error::LycanError;
pub use frame::{ClientFrame, ServerFrame};
pub use server::Server;

pub use lycan_engine::Game;

pub mod prelude {
    pub use crate::{ClientFrame, LycanError, Server, ServerFrame};
    pub use lycan_engine::{
        DayActionKind, EngineError, ErrorKind, Game, GameConfig, NightAction,
        NightActionKind, Notice, Outcome, Phase, Role, RoleCount, Snapshot,
        Team, Winner,
    };
    pub use lycan_protocol::{
        Codec, ConnectionRef, JsonCodec, PlayerId, Recipient, RoomId,
    };
    pub use lycan_room::{
        ClientCommand, CommandReply, RoomConfig, RoomError, RoomInfo,
        RoomManager, ServerEvent,
    };
}
