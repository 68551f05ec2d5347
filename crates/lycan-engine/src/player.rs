//! The player registry: who is in the room and what state they are in.
//!
//! The registry is owned by [`Game`](crate::Game) and is the only place
//! that flips a player's `alive` flag. The flag and the living set are
//! always updated together in [`Registry::kill`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use lycan_protocol::{ConnectionRef, PlayerId};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Potion, Role, RoleCount, Team};

/// Counter for generating unique player IDs across every room in the process.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// The witch's inventory. Each flag only ever goes from `true` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potions {
    pub antidote: bool,
    pub poison: bool,
}

impl Potions {
    pub fn full() -> Self {
        Self {
            antidote: true,
            poison: true,
        }
    }

    pub fn has(&self, potion: Potion) -> bool {
        match potion {
            Potion::Antidote => self.antidote,
            Potion::Poison => self.poison,
        }
    }

    pub(crate) fn consume(&mut self, potion: Potion) {
        match potion {
            Potion::Antidote => self.antidote = false,
            Potion::Poison => self.poison = false,
        }
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connection: ConnectionRef,
    pub role: Option<Role>,
    pub alive: bool,
    pub can_vote: bool,
    /// Present while the player holds a potion-carrying role.
    pub potions: Option<Potions>,
}

impl Player {
    pub fn team(&self) -> Option<Team> {
        self.role.map(Role::team)
    }

    pub fn is_werewolf(&self) -> bool {
        self.team() == Some(Team::Werewolf)
    }
}

/// Per-room map of players plus the living set.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    players: BTreeMap<PlayerId, Player>,
    living: BTreeSet<PlayerId>,
    host: Option<PlayerId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player with a fresh id. The first player becomes host.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        connection: ConnectionRef,
    ) -> PlayerId {
        let id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
        self.players.insert(
            id,
            Player {
                id,
                name: name.into(),
                connection,
                role: None,
                alive: true,
                can_vote: true,
                potions: None,
            },
        );
        self.living.insert(id);
        if self.host.is_none() {
            self.host = Some(id);
        }
        id
    }

    /// Removes a player. If they were host, the lowest remaining id takes over.
    pub fn unregister(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.living.remove(&id);
        if self.host == Some(id) {
            self.host = self.players.keys().next().copied();
        }
        Some(player)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    pub fn living(&self) -> &BTreeSet<PlayerId> {
        &self.living
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.living.contains(&id)
    }

    /// Living players who still hold the right to vote.
    pub fn voters(&self) -> BTreeSet<PlayerId> {
        self.living
            .iter()
            .copied()
            .filter(|id| self.players.get(id).is_some_and(|p| p.can_vote))
            .collect()
    }

    pub fn role(&self, id: PlayerId) -> Option<Role> {
        self.players.get(&id).and_then(|p| p.role)
    }

    pub fn name(&self, id: PlayerId) -> &str {
        self.players.get(&id).map_or("?", |p| p.name.as_str())
    }

    pub fn player_by_connection(
        &self,
        connection: ConnectionRef,
    ) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.connection == connection)
            .map(|p| p.id)
    }

    /// Living members of `team`, in id order.
    pub fn living_on_team(&self, team: Team) -> Vec<PlayerId> {
        self.living
            .iter()
            .copied()
            .filter(|id| self.players.get(id).and_then(Player::team) == Some(team))
            .collect()
    }

    /// The lowest-id living werewolf: the only one whose kill counts.
    pub fn wolf_leader(&self) -> Option<PlayerId> {
        self.living_on_team(Team::Werewolf).first().copied()
    }

    /// Marks a player dead and removes them from the living set.
    /// Returns `false` if they were not alive.
    pub(crate) fn kill(&mut self, id: PlayerId) -> bool {
        if !self.living.remove(&id) {
            return false;
        }
        if let Some(player) = self.players.get_mut(&id) {
            player.alive = false;
        }
        true
    }

    pub(crate) fn revoke_vote(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.can_vote = false;
        }
    }

    pub(crate) fn potions_mut(&mut self, id: PlayerId) -> Option<&mut Potions> {
        self.players.get_mut(&id).and_then(|p| p.potions.as_mut())
    }

    /// Swaps two players' roles, carrying role-specific state along.
    pub(crate) fn swap_roles(&mut self, a: PlayerId, b: PlayerId) {
        if a == b {
            return;
        }
        let (Some(first), Some(second)) =
            (self.players.get(&a).cloned(), self.players.get(&b).cloned())
        else {
            return;
        };
        if let Some(p) = self.players.get_mut(&a) {
            p.role = second.role;
            p.potions = second.potions;
        }
        if let Some(p) = self.players.get_mut(&b) {
            p.role = first.role;
            p.potions = first.potions;
        }
    }

    /// Shuffles the configured multiset and deals one role per player.
    ///
    /// # Errors
    /// [`EngineError::RoleCountMismatch`] if the total differs from the
    /// player count. Nothing is assigned in that case.
    pub fn assign_roles<R: Rng + ?Sized>(
        &mut self,
        config: &[RoleCount],
        rng: &mut R,
    ) -> Result<(), EngineError> {
        let mut deck: Vec<Role> = config
            .iter()
            .flat_map(|rc| std::iter::repeat_n(rc.role, rc.count))
            .collect();
        if deck.len() != self.players.len() {
            return Err(EngineError::RoleCountMismatch {
                roles: deck.len(),
                players: self.players.len(),
            });
        }
        deck.shuffle(rng);
        self.deal(deck)
    }

    /// Deals `roles` to players in id order, without shuffling.
    pub fn deal(&mut self, roles: Vec<Role>) -> Result<(), EngineError> {
        if roles.len() != self.players.len() {
            return Err(EngineError::RoleCountMismatch {
                roles: roles.len(),
                players: self.players.len(),
            });
        }
        for (player, role) in self.players.values_mut().zip(roles) {
            player.role = Some(role);
            player.potions = (role == Role::Witch).then(Potions::full);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn registry(n: usize) -> (Registry, Vec<PlayerId>) {
        let mut reg = Registry::new();
        let ids = (0..n)
            .map(|i| reg.register(format!("p{i}"), ConnectionRef(i as u64)))
            .collect();
        (reg, ids)
    }

    #[test]
    fn test_first_player_is_host() {
        let (reg, ids) = registry(3);
        assert_eq!(reg.host(), Some(ids[0]));
    }

    #[test]
    fn test_ids_increase_in_registration_order() {
        let (_, ids) = registry(4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_host_transfers_to_lowest_remaining() {
        let (mut reg, ids) = registry(3);
        reg.unregister(ids[0]);
        assert_eq!(reg.host(), Some(ids[1]));
        reg.unregister(ids[1]);
        reg.unregister(ids[2]);
        assert_eq!(reg.host(), None);
    }

    #[test]
    fn test_kill_keeps_flag_and_set_in_sync() {
        let (mut reg, ids) = registry(2);
        assert!(reg.kill(ids[0]));
        assert!(!reg.kill(ids[0]));
        assert!(!reg.get(ids[0]).unwrap().alive);
        assert!(!reg.living().contains(&ids[0]));
        let living: BTreeSet<PlayerId> =
            reg.iter().filter(|p| p.alive).map(|p| p.id).collect();
        assert_eq!(&living, reg.living());
    }

    #[test]
    fn test_assign_roles_is_a_bijection() {
        let (mut reg, _) = registry(6);
        let config = vec![
            RoleCount::new(Role::Werewolf, 2),
            RoleCount::new(Role::Seer, 1),
            RoleCount::new(Role::Witch, 1),
            RoleCount::new(Role::Villager, 2),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        reg.assign_roles(&config, &mut rng).unwrap();

        let mut dealt: Vec<Role> = reg.iter().filter_map(|p| p.role).collect();
        dealt.sort();
        let mut expected = vec![
            Role::Werewolf,
            Role::Werewolf,
            Role::Seer,
            Role::Witch,
            Role::Villager,
            Role::Villager,
        ];
        expected.sort();
        assert_eq!(dealt, expected);

        let witch = reg.iter().find(|p| p.role == Some(Role::Witch)).unwrap();
        assert_eq!(witch.potions, Some(Potions::full()));
        assert!(
            reg.iter()
                .filter(|p| p.role != Some(Role::Witch))
                .all(|p| p.potions.is_none())
        );
    }

    #[test]
    fn test_assign_roles_rejects_count_mismatch() {
        let (mut reg, _) = registry(4);
        let config = vec![RoleCount::new(Role::Villager, 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let err = reg.assign_roles(&config, &mut rng).unwrap_err();
        assert_eq!(err, EngineError::RoleCountMismatch { roles: 3, players: 4 });
        assert!(reg.iter().all(|p| p.role.is_none()));
    }

    #[test]
    fn test_wolf_leader_is_lowest_living_werewolf() {
        let (mut reg, ids) = registry(4);
        reg.deal(vec![Role::Villager, Role::WolfKing, Role::Werewolf, Role::Seer])
            .unwrap();
        assert_eq!(reg.wolf_leader(), Some(ids[1]));
        reg.kill(ids[1]);
        assert_eq!(reg.wolf_leader(), Some(ids[2]));
        reg.kill(ids[2]);
        assert_eq!(reg.wolf_leader(), None);
    }

    #[test]
    fn test_swap_roles_moves_potions() {
        let (mut reg, ids) = registry(2);
        reg.deal(vec![Role::Witch, Role::Villager]).unwrap();
        reg.swap_roles(ids[0], ids[1]);
        assert_eq!(reg.role(ids[0]), Some(Role::Villager));
        assert_eq!(reg.get(ids[0]).unwrap().potions, None);
        assert_eq!(reg.role(ids[1]), Some(Role::Witch));
        assert_eq!(reg.get(ids[1]).unwrap().potions, Some(Potions::full()));
    }

    #[test]
    fn test_player_by_connection() {
        let (reg, ids) = registry(3);
        assert_eq!(reg.player_by_connection(ConnectionRef(2)), Some(ids[2]));
        assert_eq!(reg.player_by_connection(ConnectionRef(99)), None);
    }
}
