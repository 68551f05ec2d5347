//! The role catalog: twelve fixed role definitions.
//!
//! Rules code never matches on a [`Role`] directly to decide what a player
//! may do. It asks for the role's [`Ability`] and switches over that tag, so
//! a new role only needs a new catalog row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Win-condition grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Village,
    Werewolf,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Village => write!(f, "village"),
            Self::Werewolf => write!(f, "werewolf"),
        }
    }
}

/// The ability tag a role carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    None,
    Kill,
    Check,
    Potion,
    Protect,
    ShootOnDeath,
    /// The hunter's tag. Descriptive only: nothing resolves it.
    Shoot,
    SelfDestruct,
    Duel,
    SurviveVote,
    Exchange,
    Peek,
}

impl Ability {
    /// Returns `true` if dying with this ability interrupts the game with a
    /// revenge shot.
    pub fn raises_revenge(self) -> bool {
        matches!(self, Self::ShootOnDeath)
    }
}

/// Every role a player can be dealt.
///
/// Serialized with the catalog keys (`"wolf_king"`, `"little_girl"`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Witch,
    Hunter,
    Guard,
    WolfKing,
    WhiteWolfKing,
    Knight,
    Idiot,
    Magician,
    LittleGirl,
}

/// One immutable row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub team: Team,
    pub ability: Ability,
    pub description: &'static str,
}

const fn row(
    key: &'static str,
    name: &'static str,
    team: Team,
    ability: Ability,
    description: &'static str,
) -> RoleDefinition {
    RoleDefinition {
        key,
        name,
        team,
        ability,
        description,
    }
}

// Indexed by `Role as usize`; keep the order in sync with the enum.
#[rustfmt::skip]
static CATALOG: [RoleDefinition; 12] = [
    row("villager", "Villager", Team::Village, Ability::None,
        "An ordinary villager with no special ability."),
    row("werewolf", "Werewolf", Team::Werewolf, Ability::Kill,
        "Chooses a victim with the pack every night."),
    row("seer", "Seer", Team::Village, Ability::Check,
        "Learns each night whether one player is a werewolf."),
    row("witch", "Witch", Team::Village, Ability::Potion,
        "Holds one antidote and one poison, each usable once."),
    row("hunter", "Hunter", Team::Village, Ability::Shoot,
        "Takes one player down with them on death."),
    row("guard", "Guard", Team::Village, Ability::Protect,
        "Protects one player from the wolves each night."),
    row("wolf_king", "Wolf King", Team::Werewolf, Ability::ShootOnDeath,
        "Takes one player down with them on death."),
    row("white_wolf_king", "White Wolf King", Team::Werewolf, Ability::SelfDestruct,
        "May explode during the day, taking one player along."),
    row("knight", "Knight", Team::Village, Ability::Duel,
        "May challenge one player to a duel during the day."),
    row("idiot", "Idiot", Team::Village, Ability::SurviveVote,
        "Survives being voted out but loses the right to vote."),
    row("magician", "Magician", Team::Village, Ability::Exchange,
        "Swaps the roles of two players each night."),
    row("little_girl", "Little Girl", Team::Village, Ability::Peek,
        "Peeks at the werewolves' choice during the night."),
];

impl Role {
    /// All roles in catalog order.
    pub const ALL: [Role; 12] = [
        Role::Villager,
        Role::Werewolf,
        Role::Seer,
        Role::Witch,
        Role::Hunter,
        Role::Guard,
        Role::WolfKing,
        Role::WhiteWolfKing,
        Role::Knight,
        Role::Idiot,
        Role::Magician,
        Role::LittleGirl,
    ];

    pub fn definition(self) -> &'static RoleDefinition {
        &CATALOG[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.definition().key
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn team(self) -> Team {
        self.definition().team
    }

    pub fn ability(self) -> Ability {
        self.definition().ability
    }

    /// Looks a role up by its catalog key.
    pub fn from_key(key: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of a role configuration: deal `count` copies of `role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

impl RoleCount {
    pub fn new(role: Role, count: usize) -> Self {
        Self { role, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_rows_match_enum_order() {
        for role in Role::ALL {
            assert_eq!(Role::from_key(role.key()), Some(role));
        }
    }

    #[test]
    fn test_catalog_keys_match_serde_names() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.key()));
        }
    }

    #[test]
    fn test_teams() {
        let wolves: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| r.team() == Team::Werewolf)
            .collect();
        assert_eq!(
            wolves,
            vec![Role::Werewolf, Role::WolfKing, Role::WhiteWolfKing]
        );
    }

    #[test]
    fn test_revenge_abilities() {
        assert!(Role::WolfKing.ability().raises_revenge());
        assert!(!Role::Hunter.ability().raises_revenge());
        assert!(!Role::Werewolf.ability().raises_revenge());
        assert!(!Role::Idiot.ability().raises_revenge());
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(Role::from_key("vampire"), None);
    }
}
