//! Error types for the room layer.

use lycan_engine::EngineError;
use lycan_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full, no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The request doesn't fit the caller's current situation, e.g. a
    /// connection trying to sit at two tables.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// Someone other than the pending avenger tried to fire the revenge.
    #[error("player {0} is not the one taking revenge")]
    NotAvenger(PlayerId),

    /// The engine rejected the operation. The game is unchanged.
    #[error(transparent)]
    Game(#[from] EngineError),
}
