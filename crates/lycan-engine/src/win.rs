//! Win condition evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Village,
    Werewolves,
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Village => write!(f, "the village"),
            Self::Werewolves => write!(f, "the werewolves"),
            Self::Draw => write!(f, "nobody"),
        }
    }
}

/// Decides the game from the teams of the living players.
///
/// Nobody alive is a draw; no werewolves is a village win; werewolves at
/// least matching villagers is a werewolf win.
pub fn evaluate<I>(living_teams: I) -> Option<Winner>
where
    I: IntoIterator<Item = Team>,
{
    let (mut wolves, mut village, mut any) = (0usize, 0usize, false);
    for team in living_teams {
        any = true;
        match team {
            Team::Werewolf => wolves += 1,
            Team::Village => village += 1,
        }
    }
    if !any {
        Some(Winner::Draw)
    } else if wolves == 0 {
        Some(Winner::Village)
    } else if wolves >= village {
        Some(Winner::Werewolves)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Team::{Village as V, Werewolf as W};

    #[test]
    fn test_empty_is_draw() {
        assert_eq!(evaluate(Vec::<Team>::new()), Some(Winner::Draw));
    }

    #[test]
    fn test_no_wolves_is_village_win() {
        assert_eq!(evaluate([V, V]), Some(Winner::Village));
    }

    #[test]
    fn test_parity_is_werewolf_win() {
        assert_eq!(evaluate([W, V]), Some(Winner::Werewolves));
        assert_eq!(evaluate([W, W, V]), Some(Winner::Werewolves));
        assert_eq!(evaluate([W]), Some(Winner::Werewolves));
    }

    #[test]
    fn test_game_continues() {
        assert_eq!(evaluate([W, V, V]), None);
        assert_eq!(evaluate([W, W, V, V, V]), None);
    }
}
