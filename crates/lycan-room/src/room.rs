//! Room actor: an isolated Tokio task that owns one game.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The engine is synchronous and single-writer;
//! the actor loop is what serialises every call into it.

use std::collections::HashMap;

use lycan_engine::{Game, Outcome, Phase, Snapshot};
use lycan_protocol::{ConnectionRef, PlayerId, Recipient, RoomId};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{ClientCommand, CommandReply, RoomConfig, RoomError, ServerEvent};

/// Channel sender for delivering events to a player's connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Every variant except `Shutdown` carries a reply channel; the caller
/// sends the command and waits on the `oneshot` for the answer.
pub(crate) enum RoomCommand {
    /// Seat a new player.
    Join {
        name: String,
        connection: ConnectionRef,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<PlayerId, RoomError>>,
    },

    /// Remove a player by id.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },

    /// Remove whoever sits behind a dropped connection.
    Disconnect {
        connection: ConnectionRef,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },

    /// Run a player's game command.
    Command {
        sender: PlayerId,
        command: ClientCommand,
        reply: oneshot::Sender<Result<CommandReply, RoomError>>,
    },

    /// Public state as seen by `viewer`.
    Snapshot {
        viewer: Option<PlayerId>,
        reply: oneshot::Sender<Snapshot>,
    },

    /// Room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: Phase,
    pub player_count: usize,
    pub max_players: usize,
    /// Seated players whose event channel is still open.
    pub listening: usize,
}

impl RoomInfo {
    /// Still in the lobby with a free seat.
    pub fn is_joinable(&self) -> bool {
        self.phase == Phase::Waiting && self.player_count < self.max_players
    }

    /// The game is over and nobody is left to read its final state.
    pub fn is_drained(&self) -> bool {
        self.phase == Phase::Ended && self.listening == 0
    }
}

/// Who left a room, and how many are still seated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub player_id: PlayerId,
    pub connection: ConnectionRef,
    pub remaining: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone, it's just an `mpsc::Sender` wrapper.
/// The `RoomManager` holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Sends a command and waits for the actor's answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Seats a player and returns the id the engine gave them.
    pub async fn join(
        &self,
        name: impl Into<String>,
        connection: ConnectionRef,
        sender: PlayerSender,
    ) -> Result<PlayerId, RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            name,
            connection,
            sender,
            reply,
        })
        .await?
    }

    pub async fn leave(
        &self,
        player_id: PlayerId,
    ) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    pub async fn disconnect(
        &self,
        connection: ConnectionRef,
    ) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Disconnect { connection, reply })
            .await?
    }

    pub async fn command(
        &self,
        sender: PlayerId,
        command: ClientCommand,
    ) -> Result<CommandReply, RoomError> {
        self.request(|reply| RoomCommand::Command {
            sender,
            command,
            reply,
        })
        .await?
    }

    pub async fn snapshot(
        &self,
        viewer: Option<PlayerId>,
    ) -> Result<Snapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { viewer, reply })
            .await
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::Info { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    game: Game,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    name,
                    connection,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(name, connection, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let _ = reply.send(self.handle_leave(player_id));
                }
                RoomCommand::Disconnect { connection, reply } => {
                    let result = match self.game.player_by_connection(connection)
                    {
                        Some(player_id) => self.handle_leave(player_id),
                        None => Err(RoomError::InvalidState(format!(
                            "connection {connection} has no seat in room {}",
                            self.room_id
                        ))),
                    };
                    let _ = reply.send(result);
                }
                RoomCommand::Command {
                    sender,
                    command,
                    reply,
                } => {
                    let result = self.handle_command(sender, command);
                    if let Err(err) = &result {
                        tracing::debug!(
                            room_id = %self.room_id,
                            %sender,
                            error = %err,
                            "command rejected"
                        );
                    }
                    let _ = reply.send(result);
                }
                RoomCommand::Snapshot { viewer, reply } => {
                    let _ = reply.send(self.game.snapshot(viewer));
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        name: String,
        connection: ConnectionRef,
        sender: PlayerSender,
    ) -> Result<PlayerId, RoomError> {
        if self.game.registry().len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room_id));
        }
        let player_id = self.game.register(name.clone(), connection)?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.game.registry().len(),
            "player joined"
        );

        self.dispatch(vec![(
            Recipient::AllExcept(player_id),
            ServerEvent::PlayerJoined {
                player: player_id,
                name,
            },
        )]);
        self.broadcast_state();
        Ok(player_id)
    }

    fn handle_leave(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Departure, RoomError> {
        let player = self
            .game
            .player(player_id)
            .ok_or(RoomError::NotInRoom(player_id, self.room_id))?;
        let name = player.name.clone();
        let connection = player.connection;

        let outcome = self.game.unregister(player_id)?;
        self.senders.remove(&player_id);
        let remaining = self.game.registry().len();
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = remaining,
            phase = %outcome.phase,
            "player left"
        );

        self.dispatch(vec![(
            Recipient::All,
            ServerEvent::PlayerLeft {
                player: player_id,
                name,
            },
        )]);
        self.publish(&outcome);
        Ok(Departure {
            player_id,
            connection,
            remaining,
        })
    }

    fn handle_command(
        &mut self,
        sender: PlayerId,
        command: ClientCommand,
    ) -> Result<CommandReply, RoomError> {
        if self.game.player(sender).is_none() {
            return Err(RoomError::NotInRoom(sender, self.room_id));
        }
        tracing::debug!(
            room_id = %self.room_id,
            %sender,
            command = command.name(),
            "command received"
        );

        let night_action = command.night_action();
        let outcome = match command {
            ClientCommand::SetRoles { roles } => {
                self.game.set_role_configuration(sender, roles)?;
                self.dispatch(vec![(
                    Recipient::All,
                    ServerEvent::RolesUpdated {
                        roles: self.game.role_configuration().to_vec(),
                    },
                )]);
                None
            }
            ClientCommand::StartGame => {
                let reveals = self.game.start(sender)?;
                tracing::info!(
                    room_id = %self.room_id,
                    players = reveals.len(),
                    "game started"
                );
                self.dispatch(
                    reveals
                        .into_iter()
                        .map(|reveal| {
                            (
                                Recipient::Player(reveal.player),
                                ServerEvent::RoleAssigned { reveal },
                            )
                        })
                        .collect(),
                );
                self.broadcast_state();
                None
            }
            ClientCommand::NightAction { .. } => {
                if let Some(action) = night_action {
                    self.game.submit_night_action(sender, action)?;
                }
                None
            }
            ClientCommand::ConfirmNight => Some(self.game.confirm_night(sender)?),
            ClientCommand::DayAction { kind, target } => {
                Some(self.game.submit_day_action(sender, kind, target)?)
            }
            ClientCommand::ConfirmDay => Some(self.game.confirm_day(sender)?),
            ClientCommand::Vote { target } => {
                self.game.submit_vote(sender, target)?;
                None
            }
            ClientCommand::ConfirmVote => Some(self.game.confirm_vote(sender)?),
            ClientCommand::Revenge { target } => {
                self.check_avenger(sender)?;
                Some(self.game.resolve_revenge(target)?)
            }
            ClientCommand::WolfChat { text } => {
                let chat = self.game.wolf_chat(sender, text)?;
                self.dispatch(vec![(
                    Recipient::Players(chat.recipients),
                    ServerEvent::WolfChat {
                        from: chat.from,
                        from_name: chat.from_name,
                        text: chat.text,
                    },
                )]);
                None
            }
        };

        Ok(match outcome {
            Some(outcome) => {
                self.publish(&outcome);
                CommandReply {
                    phase: outcome.phase,
                    day: outcome.day,
                    resolved: outcome.resolved,
                    outstanding: outcome.outstanding,
                }
            }
            None => CommandReply {
                phase: self.game.phase(),
                day: self.game.day(),
                resolved: false,
                outstanding: 0,
            },
        })
    }

    /// Only the pending avenger may shoot, unless they have left the room.
    fn check_avenger(&self, sender: PlayerId) -> Result<(), RoomError> {
        match self.game.pending_revenge() {
            Some(pending)
                if pending.avenger != sender
                    && self.game.player(pending.avenger).is_some() =>
            {
                Err(RoomError::NotAvenger(sender))
            }
            _ => Ok(()),
        }
    }

    /// Routes an outcome: private notices to their recipient, then fresh
    /// state to everyone when something public changed.
    fn publish(&self, outcome: &Outcome) {
        self.dispatch(
            outcome
                .notices
                .iter()
                .map(|n| {
                    (
                        Recipient::Player(n.recipient),
                        ServerEvent::Notice {
                            notice: n.notice.clone(),
                        },
                    )
                })
                .collect(),
        );
        if outcome.resolved {
            self.broadcast_state();
        }
        if let Some(winner) = outcome.winner {
            tracing::info!(room_id = %self.room_id, %winner, "game finished");
        }
    }

    /// Sends each player the state as they are allowed to see it.
    fn broadcast_state(&self) {
        for player_id in self.senders.keys() {
            self.send_to(
                *player_id,
                ServerEvent::State {
                    snapshot: self.game.snapshot(Some(*player_id)),
                },
            );
        }
    }

    /// Dispatches events to the correct recipients.
    fn dispatch(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::Player(player_id) => self.send_to(player_id, event),
                recipient => {
                    for player_id in self.senders.keys() {
                        if recipient.includes(*player_id) {
                            self.send_to(*player_id, event.clone());
                        }
                    }
                }
            }
        }
    }

    /// Sends an event to a single player. Silently drops if the receiver
    /// is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            phase: self.game.phase(),
            player_count: self.game.registry().len(),
            max_players: self.config.max_players,
            listening: self
                .senders
                .values()
                .filter(|sender| !sender.is_closed())
                .count(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(room_id: RoomId, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RoomActor {
        room_id,
        game: Game::new(config.game.clone()),
        config,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
