//! Read-only snapshots handed out for broadcast.
//!
//! Every view is an owned copy, so callers can hold it across awaits
//! while the room keeps mutating the game.

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Ability, Phase, Potions, Role, Team, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub can_vote: bool,
    /// Only filled in for the viewer themself, or for everyone once ended.
    pub role: Option<Role>,
    pub team: Option<Team>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevengeView {
    pub avenger: PlayerId,
    pub avenger_name: String,
}

/// Public state of a room as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub day: u32,
    pub host: Option<PlayerId>,
    pub is_host: bool,
    pub players: Vec<PlayerView>,
    pub log: Vec<String>,
    pub revenge: Option<RevengeView>,
    pub winner: Option<Winner>,
}

impl Snapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teammate {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
}

/// What a player privately learns about themself when roles are dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReveal {
    pub player: PlayerId,
    pub role: Role,
    pub role_name: String,
    pub team: Team,
    pub ability: Ability,
    pub description: String,
    /// Living fellow werewolves; empty for the village.
    pub teammates: Vec<Teammate>,
    pub wolf_leader: bool,
    pub potions: Option<Potions>,
}

/// A wolf-channel message and who may read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WolfChat {
    pub from: PlayerId,
    pub from_name: String,
    pub text: String,
    pub recipients: Vec<PlayerId>,
}
