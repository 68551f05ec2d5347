//! Frames: the envelope a transport moves between a client and [`Server`].
//!
//! Lobby operations (create, join, list, leave) live here; everything that
//! touches the game rides inside `ClientFrame::Game`.
//!
//! [`Server`]: crate::Server

use lycan_engine::{ErrorKind, Snapshot};
use lycan_protocol::{PlayerId, RoomId};
use lycan_room::{ClientCommand, CommandReply, RoomInfo, ServerEvent};
use serde::{Deserialize, Serialize};

use crate::LycanError;

/// What a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    CreateRoom { name: String },
    JoinRoom { room: RoomId, name: String },
    ListRooms,
    Leave,
    /// Ask for the current state of the caller's room.
    State,
    Game { command: ClientCommand },
}

/// What the server answers with, or pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Seated {
        room: RoomId,
        player: PlayerId,
    },
    Rooms {
        rooms: Vec<RoomInfo>,
    },
    Left,
    State {
        snapshot: Snapshot,
    },
    Reply {
        reply: CommandReply,
    },
    Event {
        event: ServerEvent,
    },
    /// A rejected request. Nothing changed.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ErrorKind>,
    },
}

impl ServerFrame {
    pub fn error(err: &LycanError) -> Self {
        Self::Error {
            message: err.to_string(),
            kind: err.engine_error().map(|e| e.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lycan_engine::EngineError;

    #[test]
    fn test_game_frame_wire_format() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"game","command":{"type":"vote","target":3}}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ClientFrame::Game {
                command: ClientCommand::Vote {
                    target: PlayerId(3)
                }
            }
        );
    }

    #[test]
    fn test_error_frame_carries_kind() {
        let err = LycanError::Engine(EngineError::NotHost(PlayerId(2)));
        let json = serde_json::to_value(ServerFrame::error(&err)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "unauthorized");
        assert_eq!(json["message"], "only the host can do that");
    }

    #[test]
    fn test_error_frame_without_kind() {
        let err = LycanError::Protocol(lycan_protocol::ProtocolError::InvalidMessage(
            "closed".into(),
        ));
        let json = serde_json::to_value(ServerFrame::error(&err)).unwrap();
        assert!(json.get("kind").is_none());
    }
}
