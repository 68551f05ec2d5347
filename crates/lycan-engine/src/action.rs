//! Actions players submit during the night and the day.

use std::fmt;

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::Ability;

/// What a player declares at night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightActionKind {
    Kill,
    Check,
    Protect,
    Poison,
    Antidote,
    Exchange,
    Peek,
}

impl NightActionKind {
    /// The ability tag a role must carry to declare this action.
    pub fn required_ability(self) -> Ability {
        match self {
            Self::Kill => Ability::Kill,
            Self::Check => Ability::Check,
            Self::Protect => Ability::Protect,
            Self::Poison | Self::Antidote => Ability::Potion,
            Self::Exchange => Ability::Exchange,
            Self::Peek => Ability::Peek,
        }
    }

    /// How many targets the action names.
    pub fn target_count(self) -> usize {
        match self {
            Self::Peek => 0,
            Self::Exchange => 2,
            _ => 1,
        }
    }

    /// The potion this action spends, if any.
    pub fn potion(self) -> Option<Potion> {
        match self {
            Self::Poison => Some(Potion::Poison),
            Self::Antidote => Some(Potion::Antidote),
            _ => None,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Check => "check",
            Self::Protect => "protect",
            Self::Poison => "poison",
            Self::Antidote => "use the antidote",
            Self::Exchange => "exchange",
            Self::Peek => "peek",
        }
    }
}

/// One buffered night action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAction {
    pub kind: NightActionKind,
    #[serde(default)]
    pub target: Option<PlayerId>,
    #[serde(default)]
    pub second_target: Option<PlayerId>,
}

impl NightAction {
    pub fn new(kind: NightActionKind, target: Option<PlayerId>) -> Self {
        Self {
            kind,
            target,
            second_target: None,
        }
    }

    pub fn targeting(kind: NightActionKind, target: PlayerId) -> Self {
        Self::new(kind, Some(target))
    }

    pub fn exchange(first: PlayerId, second: PlayerId) -> Self {
        Self {
            kind: NightActionKind::Exchange,
            target: Some(first),
            second_target: Some(second),
        }
    }

    pub fn peek() -> Self {
        Self::new(NightActionKind::Peek, None)
    }
}

/// What a player declares during the day. Applied immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayActionKind {
    Duel,
    SelfDestruct,
}

impl DayActionKind {
    pub fn required_ability(self) -> Ability {
        match self {
            Self::Duel => Ability::Duel,
            Self::SelfDestruct => Ability::SelfDestruct,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Duel => "duel",
            Self::SelfDestruct => "self-destruct",
        }
    }
}

/// The witch's two single-use potions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Potion {
    Antidote,
    Poison,
}

impl fmt::Display for Potion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Antidote => write!(f, "antidote"),
            Self::Poison => write!(f, "poison"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potion_actions_share_the_potion_ability() {
        assert_eq!(NightActionKind::Poison.required_ability(), Ability::Potion);
        assert_eq!(NightActionKind::Antidote.required_ability(), Ability::Potion);
        assert_eq!(NightActionKind::Poison.potion(), Some(Potion::Poison));
        assert_eq!(NightActionKind::Check.potion(), None);
    }

    #[test]
    fn test_target_counts() {
        assert_eq!(NightActionKind::Peek.target_count(), 0);
        assert_eq!(NightActionKind::Kill.target_count(), 1);
        assert_eq!(NightActionKind::Exchange.target_count(), 2);
    }

    #[test]
    fn test_night_action_deserializes_without_targets() {
        let action: NightAction =
            serde_json::from_str(r#"{"kind":"peek"}"#).unwrap();
        assert_eq!(action, NightAction::peek());
    }
}
