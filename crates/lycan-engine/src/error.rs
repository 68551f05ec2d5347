//! Error types for the engine.
//!
//! Every rejected operation returns an [`EngineError`] and leaves the game
//! exactly as it was. None of these are fatal to the room.

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Phase, Potion, Role};

/// Coarse category of a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The operation is not legal in the current phase.
    WrongPhase,
    /// The caller may not perform this operation (not host, wrong role, dead).
    Unauthorized,
    /// A target is missing, dead, unknown, or otherwise not allowed.
    InvalidTarget,
    /// A one-shot resource (a witch potion) was already spent.
    ResourceExhausted,
    /// The role configuration does not fit the room.
    MalformedConfiguration,
}

/// Errors returned by [`Game`](crate::Game) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("not allowed during the {0} phase")]
    WrongPhase(Phase),

    #[error("the game has already ended")]
    GameOver,

    #[error("no revenge is waiting to be resolved")]
    NoPendingRevenge,

    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),

    #[error("only the host can do that")]
    NotHost(PlayerId),

    #[error("dead players cannot act")]
    DeadActor(PlayerId),

    #[error("player {0} has lost the right to vote")]
    NoVotingRights(PlayerId),

    #[error("only the wolf leader decides the kill target")]
    NotWolfLeader(PlayerId),

    #[error("only living werewolves can use the wolf channel")]
    NotWerewolf(PlayerId),

    #[error("a {role} cannot {action}")]
    AbilityMismatch { role: Role, action: &'static str },

    #[error("this action needs a target")]
    MissingTarget,

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("the {0} has already been used")]
    PotionUsed(Potion),

    #[error("at least {required} players are needed, the room has {actual}")]
    NotEnoughPlayers { required: usize, actual: usize },

    #[error("set a role configuration first")]
    NoRoleConfiguration,

    #[error("role total ({roles}) does not match player count ({players})")]
    RoleCountMismatch { roles: usize, players: usize },
}

impl EngineError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongPhase(_) | Self::GameOver | Self::NoPendingRevenge => {
                ErrorKind::WrongPhase
            }
            Self::UnknownPlayer(_)
            | Self::NotHost(_)
            | Self::DeadActor(_)
            | Self::NoVotingRights(_)
            | Self::NotWolfLeader(_)
            | Self::NotWerewolf(_)
            | Self::AbilityMismatch { .. } => ErrorKind::Unauthorized,
            Self::MissingTarget | Self::InvalidTarget(_) => {
                ErrorKind::InvalidTarget
            }
            Self::PotionUsed(_) => ErrorKind::ResourceExhausted,
            Self::NotEnoughPlayers { .. }
            | Self::NoRoleConfiguration
            | Self::RoleCountMismatch { .. } => {
                ErrorKind::MalformedConfiguration
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            EngineError::WrongPhase(Phase::Day).kind(),
            ErrorKind::WrongPhase
        );
        assert_eq!(
            EngineError::NotWolfLeader(PlayerId(1)).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(EngineError::MissingTarget.kind(), ErrorKind::InvalidTarget);
        assert_eq!(
            EngineError::PotionUsed(Potion::Poison).kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(
            EngineError::RoleCountMismatch { roles: 3, players: 4 }.kind(),
            ErrorKind::MalformedConfiguration
        );
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = EngineError::RoleCountMismatch { roles: 5, players: 4 };
        assert_eq!(
            err.to_string(),
            "role total (5) does not match player count (4)"
        );
        let err = EngineError::AbilityMismatch {
            role: Role::Villager,
            action: "check",
        };
        assert_eq!(err.to_string(), "a Villager cannot check");
        assert_eq!(
            EngineError::WrongPhase(Phase::WolfKingRevenge).to_string(),
            "not allowed during the wolf_king_revenge phase"
        );
    }
}
