//! `Server`: the transport-facing front door.
//!
//! A transport calls [`Server::connect`] when a socket opens, feeds every
//! inbound frame to [`Server::handle_frame`], forwards whatever arrives on
//! the returned event channel, and calls [`Server::disconnect`] when the
//! socket closes. No sockets live here.

use std::collections::HashMap;

use lycan_protocol::{Codec, ConnectionRef, JsonCodec, PlayerId, ProtocolError};
use lycan_room::{
    PlayerSender, RoomConfig, RoomHandle, RoomManager, ServerEvent, joinable_rooms,
};
use tokio::sync::{Mutex, mpsc};

use crate::{ClientFrame, LycanError, ServerFrame};

/// One open connection and, once seated, the player behind it.
struct Session {
    sender: PlayerSender,
    player: Option<PlayerId>,
}

/// Turns encoded client frames into room operations.
///
/// Shared state sits behind Tokio mutexes so one `Server` (usually in an
/// `Arc`) can serve every connection task.
pub struct Server<C: Codec = JsonCodec> {
    rooms: Mutex<RoomManager>,
    sessions: Mutex<HashMap<ConnectionRef, Session>>,
    codec: C,
}

impl<C: Codec> Server<C> {
    pub fn new(config: RoomConfig, codec: C) -> Self {
        Self {
            rooms: Mutex::new(RoomManager::new(config)),
            sessions: Mutex::new(HashMap::new()),
            codec,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Opens a session. Events for this connection arrive on the returned
    /// channel once it is seated in a room.
    pub async fn connect(
        &self,
        connection: ConnectionRef,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let previous = self.sessions.lock().await.insert(
            connection,
            Session {
                sender,
                player: None,
            },
        );
        if previous.is_some() {
            tracing::warn!(%connection, "connection reopened, old session replaced");
        }
        tracing::debug!(%connection, "connection opened");
        receiver
    }

    /// Decodes one frame, runs it, and returns the encoded answer.
    ///
    /// # Errors
    /// Only codec failures surface as `Err`; a rejected request is
    /// answered with an encoded [`ServerFrame::Error`].
    pub async fn handle_frame(
        &self,
        connection: ConnectionRef,
        data: &[u8],
    ) -> Result<Vec<u8>, LycanError> {
        let frame: ClientFrame = self.codec.decode(data)?;
        let reply = match self.dispatch(connection, frame).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::debug!(%connection, error = %err, "request rejected");
                ServerFrame::error(&err)
            }
        };
        Ok(self.codec.encode(&reply)?)
    }

    /// Encodes a pushed event for the wire.
    pub fn encode_event(&self, event: &ServerEvent) -> Result<Vec<u8>, LycanError> {
        let frame = ServerFrame::Event {
            event: event.clone(),
        };
        Ok(self.codec.encode(&frame)?)
    }

    /// Closes a session. A seated player is removed from their room, which
    /// can complete a barrier or end the game.
    pub async fn disconnect(
        &self,
        connection: ConnectionRef,
    ) -> Result<(), LycanError> {
        let session = self.sessions.lock().await.remove(&connection);
        tracing::debug!(%connection, "connection closed");
        if let Some(Session {
            player: Some(_), ..
        }) = session
        {
            self.rooms.lock().await.disconnect(connection).await?;
        }
        Ok(())
    }

    async fn dispatch(
        &self,
        connection: ConnectionRef,
        frame: ClientFrame,
    ) -> Result<ServerFrame, LycanError> {
        match frame {
            ClientFrame::CreateRoom { name } => {
                let sender = self.unseated(connection).await?;
                let (room, player) = self
                    .rooms
                    .lock()
                    .await
                    .create_room(name, connection, sender)
                    .await?;
                self.set_player(connection, Some(player)).await;
                Ok(ServerFrame::Seated { room, player })
            }
            ClientFrame::JoinRoom { room, name } => {
                let sender = self.unseated(connection).await?;
                let player = self
                    .rooms
                    .lock()
                    .await
                    .join_room(room, name, connection, sender)
                    .await?;
                self.set_player(connection, Some(player)).await;
                Ok(ServerFrame::Seated { room, player })
            }
            ClientFrame::ListRooms => {
                let handles = self.rooms.lock().await.room_handles();
                Ok(ServerFrame::Rooms {
                    rooms: joinable_rooms(handles).await,
                })
            }
            ClientFrame::Leave => {
                let player = self.seated(connection).await?;
                self.rooms.lock().await.leave(player).await?;
                self.set_player(connection, None).await;
                Ok(ServerFrame::Left)
            }
            ClientFrame::State => {
                let player = self.seated(connection).await?;
                let room = self.room_of(player).await?;
                let snapshot = room.snapshot(Some(player)).await?;
                Ok(ServerFrame::State { snapshot })
            }
            ClientFrame::Game { command } => {
                let player = self.seated(connection).await?;
                let room = self.room_of(player).await?;
                let reply = room.command(player, command).await?;
                Ok(ServerFrame::Reply { reply })
            }
        }
    }

    /// The player's room. The manager lock is released before the caller
    /// awaits the room, so requests to different rooms never queue behind
    /// each other.
    async fn room_of(&self, player: PlayerId) -> Result<RoomHandle, LycanError> {
        Ok(self.rooms.lock().await.room_handle(player)?)
    }

    /// The session's event sender, provided it is open and not yet seated.
    async fn unseated(
        &self,
        connection: ConnectionRef,
    ) -> Result<PlayerSender, LycanError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(&connection)
            .ok_or_else(|| not_open(connection))?;
        if let Some(player) = session.player {
            return Err(ProtocolError::InvalidMessage(format!(
                "connection {connection} is already seated as {player}"
            ))
            .into());
        }
        Ok(session.sender.clone())
    }

    async fn seated(&self, connection: ConnectionRef) -> Result<PlayerId, LycanError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(&connection)
            .ok_or_else(|| not_open(connection))?;
        session.player.ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "connection {connection} has not joined a room"
            ))
            .into()
        })
    }

    async fn set_player(&self, connection: ConnectionRef, player: Option<PlayerId>) {
        if let Some(session) = self.sessions.lock().await.get_mut(&connection) {
            session.player = player;
        }
    }
}

fn not_open(connection: ConnectionRef) -> LycanError {
    ProtocolError::InvalidMessage(format!("connection {connection} is not open"))
        .into()
}
