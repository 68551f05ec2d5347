//! What an operation hands back to the collaborator.

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Phase, Winner};

/// A private result. Must only ever reach its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Seer result: team only, never the exact role.
    CheckResult {
        target: PlayerId,
        target_name: String,
        is_werewolf: bool,
    },
    /// Magician confirmation.
    Exchanged {
        first: PlayerId,
        second: PlayerId,
        message: String,
    },
    /// The wolves' raw choice, sent to living witches.
    WolfTarget {
        target: Option<PlayerId>,
        target_name: Option<String>,
    },
    /// The wolves' raw choice, as seen by a peeking little girl.
    Peeked {
        target: Option<PlayerId>,
        target_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateNotice {
    pub recipient: PlayerId,
    pub notice: Notice,
}

/// Result of a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// `true` when the operation changed public state: a barrier completed,
    /// a day action landed, a revenge resolved, or a player left mid-game.
    pub resolved: bool,
    /// Phase after the operation.
    pub phase: Phase,
    pub day: u32,
    /// Players who died during this operation, in order of death.
    pub deaths: Vec<PlayerId>,
    pub notices: Vec<PrivateNotice>,
    /// Confirmations still missing for the open barrier, if any.
    pub outstanding: usize,
    pub winner: Option<Winner>,
}

impl Outcome {
    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Notices addressed to `player`.
    pub fn notices_for(&self, player: PlayerId) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(move |n| n.recipient == player)
            .map(|n| &n.notice)
    }
}
