//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use lycan_engine::Snapshot;
use lycan_protocol::{ConnectionRef, PlayerId, RoomId};

use crate::room::spawn_room;
use crate::{
    ClientCommand, CommandReply, Departure, PlayerSender, RoomConfig,
    RoomError, RoomHandle, RoomInfo,
};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Manages all active rooms and tracks which player is in which room.
///
/// A room is created when its first player registers and destroyed when
/// its last player leaves, or once its game has ended and every seated
/// player's event channel has closed. Rooms never share state; the manager only
/// routes.
pub struct RoomManager {
    config: RoomConfig,

    /// Active rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,

    /// Maps each transport connection to its room, for disconnects.
    connection_rooms: HashMap<ConnectionRef, RoomId>,
}

impl RoomManager {
    /// Creates a new, empty room manager. Every room it spawns uses `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            connection_rooms: HashMap::new(),
        }
    }

    /// Opens a new room with `name` as its first player (and host).
    pub async fn create_room(
        &mut self,
        name: impl Into<String>,
        connection: ConnectionRef,
        sender: PlayerSender,
    ) -> Result<(RoomId, PlayerId), RoomError> {
        self.ensure_unseated(connection)?;
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_room(room_id, self.config.clone());
        let player_id = handle.join(name, connection, sender).await?;

        self.rooms.insert(room_id, handle);
        self.seat(player_id, connection, room_id);
        tracing::info!(%room_id, host = %player_id, "room created");
        Ok((room_id, player_id))
    }

    /// Seats a player in an existing room.
    pub async fn join_room(
        &mut self,
        room_id: RoomId,
        name: impl Into<String>,
        connection: ConnectionRef,
        sender: PlayerSender,
    ) -> Result<PlayerId, RoomError> {
        self.ensure_unseated(connection)?;
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        let player_id = handle.join(name, connection, sender).await?;
        self.seat(player_id, connection, room_id);
        Ok(player_id)
    }

    /// Removes a player from their room, destroying it if it empties.
    pub async fn leave(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Departure, RoomError> {
        let handle = self.room_handle(player_id)?;
        let departure = handle.leave(player_id).await?;
        self.unseat(handle.room_id(), departure).await;
        Ok(departure)
    }

    /// Removes whoever sits behind `connection`, as if they had left.
    pub async fn disconnect(
        &mut self,
        connection: ConnectionRef,
    ) -> Result<Departure, RoomError> {
        let room_id = self.connection_rooms.get(&connection).copied().ok_or_else(
            || {
                RoomError::InvalidState(format!(
                    "connection {connection} is not in any room"
                ))
            },
        )?;
        let handle = self
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))?;
        let departure = handle.disconnect(connection).await?;
        tracing::debug!(%connection, player_id = %departure.player_id, "connection dropped");
        self.unseat(room_id, departure).await;
        Ok(departure)
    }

    /// Routes a game command from a player to their current room.
    pub async fn send(
        &self,
        player_id: PlayerId,
        command: ClientCommand,
    ) -> Result<CommandReply, RoomError> {
        self.room_handle(player_id)?.command(player_id, command).await
    }

    /// The player's own view of their room.
    pub async fn snapshot(
        &self,
        player_id: PlayerId,
    ) -> Result<Snapshot, RoomError> {
        self.room_handle(player_id)?
            .snapshot(Some(player_id))
            .await
    }

    /// A handle to the player's current room.
    ///
    /// Callers that share the manager behind a lock should take the handle,
    /// release the lock, and only then await the room, so a slow room never
    /// holds up requests bound for another.
    pub fn room_handle(&self, player_id: PlayerId) -> Result<RoomHandle, RoomError> {
        let room_id = self.player_rooms.get(&player_id).ok_or_else(|| {
            RoomError::InvalidState(format!("player {player_id} is not in any room"))
        })?;
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or(RoomError::NotFound(*room_id))
    }

    /// Handles to every active room, in room id order.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        let mut handles: Vec<RoomHandle> = self.rooms.values().cloned().collect();
        handles.sort_by_key(|h| h.room_id().0);
        handles
    }

    /// Returns info about a specific room.
    pub async fn room_info(
        &self,
        room_id: RoomId,
    ) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    /// Lists all rooms that are still in the lobby with a free seat.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        joinable_rooms(self.room_handles()).await
    }

    /// Destroys every finished room whose players have all gone away.
    /// Returns the ids of the rooms it removed.
    pub async fn reap_drained(&mut self) -> Vec<RoomId> {
        let mut drained = Vec::new();
        for handle in self.room_handles() {
            if handle.info().await.is_ok_and(|info| info.is_drained()) {
                drained.push(handle.room_id());
            }
        }
        for room_id in &drained {
            let _ = self.destroy_room(*room_id).await;
        }
        drained
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(
        &mut self,
        room_id: RoomId,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        let _ = handle.shutdown().await;

        self.player_rooms.retain(|_, rid| *rid != room_id);
        self.connection_rooms.retain(|_, rid| *rid != room_id);

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Returns the room ID a player is currently in, if any.
    pub fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.player_rooms.get(&player_id).copied()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all active room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    fn ensure_unseated(&self, connection: ConnectionRef) -> Result<(), RoomError> {
        match self.connection_rooms.get(&connection) {
            Some(room_id) => Err(RoomError::InvalidState(format!(
                "connection {connection} is already in room {room_id}"
            ))),
            None => Ok(()),
        }
    }

    fn seat(&mut self, player_id: PlayerId, connection: ConnectionRef, room_id: RoomId) {
        self.player_rooms.insert(player_id, room_id);
        self.connection_rooms.insert(connection, room_id);
    }

    async fn unseat(&mut self, room_id: RoomId, departure: Departure) {
        self.player_rooms.remove(&departure.player_id);
        self.connection_rooms.remove(&departure.connection);
        let drained = match self.rooms.get(&room_id) {
            Some(_) if departure.remaining == 0 => true,
            Some(handle) => handle.info().await.is_ok_and(|info| info.is_drained()),
            None => false,
        };
        if drained {
            let _ = self.destroy_room(room_id).await;
        }
    }
}

/// Asks each room for its info and keeps the ones still in the lobby with a
/// free seat. Rooms that fail to respond (e.g., shutting down) are skipped.
pub async fn joinable_rooms(
    handles: impl IntoIterator<Item = RoomHandle>,
) -> Vec<RoomInfo> {
    let mut infos = Vec::new();
    for handle in handles {
        if let Ok(info) = handle.info().await {
            if info.is_joinable() {
                infos.push(info);
            }
        }
    }
    infos
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
