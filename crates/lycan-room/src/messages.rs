//! The room's wire vocabulary: what players send in and what comes back.
//!
//! Both enums are internally tagged with `"type"`, so a vote looks like
//! `{"type":"vote","target":7}` on the wire.

use lycan_engine::{
    DayActionKind, NightAction, NightActionKind, Notice, Phase, RoleCount,
    RoleReveal, Snapshot,
};
use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

/// A request from a seated player. The sender is implied by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    SetRoles {
        roles: Vec<RoleCount>,
    },
    StartGame,
    NightAction {
        kind: NightActionKind,
        #[serde(default)]
        target: Option<PlayerId>,
        #[serde(default)]
        second_target: Option<PlayerId>,
    },
    ConfirmNight,
    DayAction {
        kind: DayActionKind,
        target: PlayerId,
    },
    ConfirmDay,
    Vote {
        target: PlayerId,
    },
    ConfirmVote,
    Revenge {
        target: PlayerId,
    },
    WolfChat {
        text: String,
    },
}

impl ClientCommand {
    /// The engine action carried by a `NightAction` command.
    pub fn night_action(&self) -> Option<NightAction> {
        match *self {
            Self::NightAction {
                kind,
                target,
                second_target,
            } => Some(NightAction {
                kind,
                target,
                second_target,
            }),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetRoles { .. } => "set_roles",
            Self::StartGame => "start_game",
            Self::NightAction { .. } => "night_action",
            Self::ConfirmNight => "confirm_night",
            Self::DayAction { .. } => "day_action",
            Self::ConfirmDay => "confirm_day",
            Self::Vote { .. } => "vote",
            Self::ConfirmVote => "confirm_vote",
            Self::Revenge { .. } => "revenge",
            Self::WolfChat { .. } => "wolf_chat",
        }
    }
}

/// Something the room pushes to a player's outbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    PlayerJoined {
        player: PlayerId,
        name: String,
    },
    PlayerLeft {
        player: PlayerId,
        name: String,
    },
    RolesUpdated {
        roles: Vec<RoleCount>,
    },
    /// The recipient's private role card.
    RoleAssigned {
        reveal: RoleReveal,
    },
    /// Public state as seen by the recipient.
    State {
        snapshot: Snapshot,
    },
    /// A private result. Only ever sent to the player it concerns.
    Notice {
        notice: Notice,
    },
    WolfChat {
        from: PlayerId,
        from_name: String,
        text: String,
    },
}

/// The direct answer to a [`ClientCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReply {
    pub phase: Phase,
    pub day: u32,
    /// Whether the command changed public state.
    pub resolved: bool,
    /// Confirmations still missing for the open barrier.
    pub outstanding: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_wire_format() {
        let json = serde_json::to_string(&ClientCommand::Vote {
            target: PlayerId(7),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"vote","target":7}"#);
    }

    #[test]
    fn test_night_action_targets_are_optional() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"night_action","kind":"peek"}"#)
                .unwrap();
        assert_eq!(
            cmd.night_action(),
            Some(NightAction::new(NightActionKind::Peek, None))
        );
        assert_eq!(cmd.name(), "night_action");
    }

    #[test]
    fn test_unit_commands_decode() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"confirm_night"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::ConfirmNight);
        assert_eq!(cmd.night_action(), None);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let result =
            serde_json::from_str::<ClientCommand>(r#"{"type":"fly"}"#);
        assert!(result.is_err());
    }
}
