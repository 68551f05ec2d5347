//! The per-room game: state, lifecycle, and the confirmation barriers.
//!
//! Resolution logic lives next door in `night`, `day`, `vote`, and
//! `revenge`; they all extend [`Game`] with more `impl` blocks.

use std::collections::{BTreeMap, BTreeSet};

use lycan_protocol::{ConnectionRef, PlayerId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Barrier, EngineError, GameLog, NightAction, Outcome, PendingRevenge,
    Phase, Player, PrivateNotice, Registry, RevengeCause, RevengeView, Role,
    RoleCount, RoleReveal, Snapshot, Team, Teammate, PlayerView, WolfChat,
    Winner, win,
};

/// Engine settings for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum players required to start.
    pub min_players: usize,
    /// How many recent log lines a snapshot carries.
    pub log_tail: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            log_tail: 10,
        }
    }
}

/// One room's game. A single-writer state machine: every method that
/// takes `&mut self` runs to completion before anything else can observe
/// the game, so resolutions are atomic as long as the owner serialises
/// calls (the room actor does).
#[derive(Debug, Clone, Default)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) registry: Registry,
    pub(crate) phase: Phase,
    pub(crate) day: u32,
    pub(crate) roles: Vec<RoleCount>,
    pub(crate) night_actions: BTreeMap<PlayerId, NightAction>,
    pub(crate) votes: BTreeMap<PlayerId, PlayerId>,
    pub(crate) night_barrier: Barrier,
    pub(crate) day_barrier: Barrier,
    pub(crate) vote_barrier: Barrier,
    pub(crate) revenge: Option<PendingRevenge>,
    pub(crate) log: GameLog,
    pub(crate) winner: Option<Winner>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // -- Queries --

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.registry.get(id)
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.registry.host()
    }

    pub fn living(&self) -> &BTreeSet<PlayerId> {
        self.registry.living()
    }

    pub fn role_configuration(&self) -> &[RoleCount] {
        &self.roles
    }

    pub fn pending_revenge(&self) -> Option<&PendingRevenge> {
        self.revenge.as_ref()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn night_action(&self, actor: PlayerId) -> Option<&NightAction> {
        self.night_actions.get(&actor)
    }

    pub fn vote_of(&self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.get(&voter).copied()
    }

    // -- Registration --

    /// Adds a player while the room is still waiting.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        connection: ConnectionRef,
    ) -> Result<PlayerId, EngineError> {
        self.ensure_phase(Phase::Waiting)?;
        let id = self.registry.register(name, connection);
        tracing::debug!(player_id = %id, %connection, "player registered");
        Ok(id)
    }

    /// Removes a player. Outside the lobby this is a disconnect: the
    /// living set shrinks, which can end the game or complete a barrier
    /// that was only waiting on the leaver.
    pub fn unregister(
        &mut self,
        id: PlayerId,
    ) -> Result<Outcome, EngineError> {
        let player = self
            .registry
            .get(id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        let mid_game = player.alive && self.phase.is_in_progress();
        let name = player.name.clone();

        self.registry.unregister(id);
        self.night_actions.remove(&id);
        self.votes.remove(&id);
        self.night_barrier.withdraw(id);
        self.day_barrier.withdraw(id);
        self.vote_barrier.withdraw(id);
        tracing::debug!(player_id = %id, mid_game, "player unregistered");

        if !mid_game {
            return Ok(self.outcome(false, Vec::new(), Vec::new()));
        }

        self.log.push(format!("{name} left the game."));
        if self.check_winner().is_none() {
            if let Some(outcome) = self.advance_if_ready() {
                return Ok(outcome);
            }
        }
        Ok(self.outcome(true, Vec::new(), Vec::new()))
    }

    /// Looks up the player behind a transport connection.
    pub fn player_by_connection(
        &self,
        connection: ConnectionRef,
    ) -> Option<PlayerId> {
        self.registry.player_by_connection(connection)
    }

    // -- Setup --

    pub fn set_role_configuration(
        &mut self,
        caller: PlayerId,
        roles: Vec<RoleCount>,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::Waiting)?;
        self.ensure_host(caller)?;
        self.roles = roles.into_iter().filter(|rc| rc.count > 0).collect();
        Ok(())
    }

    /// Deals the configured roles at random and begins the first night.
    pub fn start(
        &mut self,
        caller: PlayerId,
    ) -> Result<Vec<RoleReveal>, EngineError> {
        self.start_with_rng(caller, &mut rand::rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        caller: PlayerId,
        rng: &mut R,
    ) -> Result<Vec<RoleReveal>, EngineError> {
        self.ensure_startable(caller)?;
        if self.roles.is_empty() {
            return Err(EngineError::NoRoleConfiguration);
        }
        let roles = self.roles.clone();
        self.registry.assign_roles(&roles, rng)?;
        Ok(self.begin())
    }

    /// Deals `roles` to players in registration order, without shuffling.
    /// Replays a known deal in tests; the role configuration is replaced by
    /// the multiset actually dealt.
    #[doc(hidden)]
    pub fn start_with_roles(
        &mut self,
        caller: PlayerId,
        roles: Vec<Role>,
    ) -> Result<Vec<RoleReveal>, EngineError> {
        self.ensure_startable(caller)?;
        let mut counts: BTreeMap<Role, usize> = BTreeMap::new();
        for role in &roles {
            *counts.entry(*role).or_default() += 1;
        }
        self.registry.deal(roles)?;
        self.roles = counts
            .into_iter()
            .map(|(role, count)| RoleCount::new(role, count))
            .collect();
        Ok(self.begin())
    }

    fn ensure_startable(&self, caller: PlayerId) -> Result<(), EngineError> {
        self.ensure_phase(Phase::Waiting)?;
        self.ensure_host(caller)?;
        if self.registry.len() < self.config.min_players {
            return Err(EngineError::NotEnoughPlayers {
                required: self.config.min_players,
                actual: self.registry.len(),
            });
        }
        Ok(())
    }

    fn begin(&mut self) -> Vec<RoleReveal> {
        self.day = 1;
        self.enter(Phase::Night);
        self.log.push("The game begins! Night 1 falls...");
        tracing::info!(players = self.registry.len(), "game started");
        self.registry
            .ids()
            .filter_map(|id| self.role_reveal(id))
            .collect()
    }

    // -- Confirmation barriers --

    /// Marks the night done for `player`. The last confirmation resolves it.
    pub fn confirm_night(
        &mut self,
        player: PlayerId,
    ) -> Result<Outcome, EngineError> {
        self.ensure_phase(Phase::Night)?;
        self.living_actor(player)?;
        self.night_barrier.confirm(player);
        Ok(self.advance_or_wait())
    }

    /// Marks the day done for `player`. The last confirmation opens voting.
    pub fn confirm_day(
        &mut self,
        player: PlayerId,
    ) -> Result<Outcome, EngineError> {
        self.ensure_phase(Phase::Day)?;
        self.living_actor(player)?;
        self.day_barrier.confirm(player);
        Ok(self.advance_or_wait())
    }

    /// Marks voting done for `player`. The last confirmation runs the tally.
    pub fn confirm_vote(
        &mut self,
        player: PlayerId,
    ) -> Result<Outcome, EngineError> {
        self.ensure_phase(Phase::Voting)?;
        self.living_voter(player)?;
        self.vote_barrier.confirm(player);
        Ok(self.advance_or_wait())
    }

    fn advance_or_wait(&mut self) -> Outcome {
        self.advance_if_ready()
            .unwrap_or_else(|| self.outcome(false, Vec::new(), Vec::new()))
    }

    /// Runs the current phase's resolution if its barrier is satisfied.
    pub(crate) fn advance_if_ready(&mut self) -> Option<Outcome> {
        match self.phase {
            Phase::Night
                if self.night_barrier.is_satisfied(self.registry.living()) =>
            {
                self.night_barrier.clear();
                Some(self.resolve_night())
            }
            Phase::Day
                if self.day_barrier.is_satisfied(self.registry.living()) =>
            {
                self.day_barrier.clear();
                self.enter(Phase::Voting);
                self.log.push(format!("Day {}: the village votes.", self.day));
                Some(self.outcome(true, Vec::new(), Vec::new()))
            }
            Phase::Voting
                if self.vote_barrier.is_satisfied(&self.registry.voters()) =>
            {
                self.vote_barrier.clear();
                Some(self.resolve_votes())
            }
            _ => None,
        }
    }

    fn outstanding(&self) -> usize {
        match self.phase {
            Phase::Night => self.night_barrier.outstanding(self.registry.living()),
            Phase::Day => self.day_barrier.outstanding(self.registry.living()),
            Phase::Voting => self.vote_barrier.outstanding(&self.registry.voters()),
            _ => 0,
        }
    }

    // -- Views --

    /// Public state for `viewer`. Roles stay hidden except the viewer's
    /// own, until the game has ended.
    pub fn snapshot(&self, viewer: Option<PlayerId>) -> Snapshot {
        let ended = self.phase.is_terminal();
        let players = self
            .registry
            .iter()
            .map(|p| {
                let visible = ended || viewer == Some(p.id);
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    alive: p.alive,
                    can_vote: p.can_vote,
                    role: p.role.filter(|_| visible),
                    team: p.team().filter(|_| visible),
                }
            })
            .collect();
        let revenge = self
            .revenge
            .as_ref()
            .filter(|_| self.phase == Phase::WolfKingRevenge)
            .map(|r| RevengeView {
                avenger: r.avenger,
                avenger_name: self.registry.name(r.avenger).to_string(),
            });
        Snapshot {
            phase: self.phase,
            day: self.day,
            host: self.registry.host(),
            is_host: viewer.is_some() && viewer == self.registry.host(),
            players,
            log: self.log.recent(self.config.log_tail),
            revenge,
            winner: self.winner,
        }
    }

    /// The private role card for `player`, once roles are dealt.
    pub fn role_reveal(&self, player: PlayerId) -> Option<RoleReveal> {
        let p = self.registry.get(player)?;
        let role = p.role?;
        let def = role.definition();
        let teammates = if def.team == Team::Werewolf {
            self.registry
                .living_on_team(Team::Werewolf)
                .into_iter()
                .filter(|id| *id != player)
                .filter_map(|id| {
                    let mate = self.registry.get(id)?;
                    Some(Teammate {
                        id,
                        name: mate.name.clone(),
                        role: mate.role?,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };
        Some(RoleReveal {
            player,
            role,
            role_name: def.name.to_string(),
            team: def.team,
            ability: def.ability,
            description: def.description.to_string(),
            teammates,
            wolf_leader: self.registry.wolf_leader() == Some(player),
            potions: p.potions,
        })
    }

    /// Validates a wolf-channel message. Only living werewolves, only at night.
    pub fn wolf_chat(
        &self,
        sender: PlayerId,
        text: impl Into<String>,
    ) -> Result<WolfChat, EngineError> {
        self.ensure_phase(Phase::Night)?;
        let role = self.living_actor(sender)?;
        if role.team() != Team::Werewolf {
            return Err(EngineError::NotWerewolf(sender));
        }
        Ok(WolfChat {
            from: sender,
            from_name: self.registry.name(sender).to_string(),
            text: text.into(),
            recipients: self.registry.living_on_team(Team::Werewolf),
        })
    }

    // -- Shared helpers --

    pub(crate) fn ensure_phase(&self, expected: Phase) -> Result<(), EngineError> {
        if self.phase.is_terminal() {
            return Err(EngineError::GameOver);
        }
        if self.phase != expected {
            return Err(EngineError::WrongPhase(self.phase));
        }
        Ok(())
    }

    fn ensure_host(&self, caller: PlayerId) -> Result<(), EngineError> {
        if !self.registry.contains(caller) {
            return Err(EngineError::UnknownPlayer(caller));
        }
        if self.registry.host() != Some(caller) {
            return Err(EngineError::NotHost(caller));
        }
        Ok(())
    }

    /// The actor's role, if they are a living player with a role.
    pub(crate) fn living_actor(&self, id: PlayerId) -> Result<Role, EngineError> {
        let player = self
            .registry
            .get(id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        if !player.alive {
            return Err(EngineError::DeadActor(id));
        }
        player.role.ok_or(EngineError::UnknownPlayer(id))
    }

    pub(crate) fn living_voter(&self, id: PlayerId) -> Result<(), EngineError> {
        self.living_actor(id)?;
        if !self.registry.get(id).is_some_and(|p| p.can_vote) {
            return Err(EngineError::NoVotingRights(id));
        }
        Ok(())
    }

    pub(crate) fn living_target(&self, id: PlayerId) -> Result<(), EngineError> {
        if !self.registry.is_alive(id) {
            return Err(EngineError::InvalidTarget(format!(
                "{id} is not a living player"
            )));
        }
        Ok(())
    }

    /// Switches phase and resets that phase's buffers.
    pub(crate) fn enter(&mut self, phase: Phase) {
        let from = self.phase;
        self.phase = phase;
        match phase {
            Phase::Night => {
                self.night_barrier.clear();
                self.night_actions.clear();
            }
            Phase::Day => self.day_barrier.clear(),
            Phase::Voting => {
                self.vote_barrier.clear();
                self.votes.clear();
            }
            Phase::Waiting | Phase::WolfKingRevenge | Phase::Ended => {}
        }
        tracing::info!(%from, to = %phase, day = self.day, "phase changed");
    }

    /// Kills `victims` in order until one of them carries a revenge
    /// ability. Returns who died and, if interrupted, the avenger with the
    /// victims still waiting.
    pub(crate) fn bury(
        &mut self,
        victims: Vec<PlayerId>,
    ) -> (Vec<PlayerId>, Option<(PlayerId, Vec<PlayerId>)>) {
        let mut killed = Vec::new();
        let mut queue = victims.into_iter();
        while let Some(victim) = queue.next() {
            if !self.registry.kill(victim) {
                continue;
            }
            killed.push(victim);
            let avenges = self
                .registry
                .role(victim)
                .is_some_and(|r| r.ability().raises_revenge());
            if avenges {
                return (killed, Some((victim, queue.collect())));
            }
        }
        (killed, None)
    }

    /// Orders victims so revenge holders die first, each group by id.
    pub(crate) fn avengers_first(
        &self,
        victims: impl IntoIterator<Item = PlayerId>,
    ) -> Vec<PlayerId> {
        let mut ordered: Vec<PlayerId> = victims.into_iter().collect();
        ordered.sort();
        ordered.dedup();
        ordered.sort_by_key(|id| {
            !self
                .registry
                .role(*id)
                .is_some_and(|r| r.ability().raises_revenge())
        });
        ordered
    }

    pub(crate) fn raise_revenge(
        &mut self,
        avenger: PlayerId,
        cause: RevengeCause,
        deferred: Vec<PlayerId>,
    ) {
        self.revenge = Some(PendingRevenge {
            avenger,
            cause,
            deferred,
        });
        self.enter(Phase::WolfKingRevenge);
    }

    /// "Name (Role)" for log lines.
    pub(crate) fn describe(&self, id: PlayerId) -> String {
        match self.registry.role(id) {
            Some(role) => format!("{} ({role})", self.registry.name(id)),
            None => self.registry.name(id).to_string(),
        }
    }

    pub(crate) fn names(&self, ids: &[PlayerId]) -> String {
        ids.iter()
            .map(|id| self.registry.name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Ends the game if someone has won. Never decides while a revenge is
    /// still waiting for its target.
    pub(crate) fn check_winner(&mut self) -> Option<Winner> {
        if self.revenge.is_some() || self.phase.is_terminal() {
            return self.winner;
        }
        let teams = self
            .registry
            .living()
            .iter()
            .filter_map(|id| self.registry.role(*id).map(Role::team))
            .collect::<Vec<_>>();
        let winner = win::evaluate(teams)?;
        self.end(winner);
        Some(winner)
    }

    fn end(&mut self, winner: Winner) {
        self.winner = Some(winner);
        self.revenge = None;
        self.night_actions.clear();
        self.votes.clear();
        self.enter(Phase::Ended);
        match winner {
            Winner::Draw => self.log.push("Game over! It's a draw."),
            _ => self.log.push(format!("Game over! Victory for {winner}!")),
        }
        tracing::info!(%winner, day = self.day, "game over");
    }

    pub(crate) fn outcome(
        &self,
        resolved: bool,
        deaths: Vec<PlayerId>,
        notices: Vec<PrivateNotice>,
    ) -> Outcome {
        Outcome {
            resolved,
            phase: self.phase,
            day: self.day,
            deaths,
            notices,
            outstanding: self.outstanding(),
            winner: self.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby(n: usize) -> (Game, Vec<PlayerId>) {
        let mut game = Game::new(GameConfig::default());
        let ids = (0..n)
            .map(|i| {
                game.register(format!("p{i}"), ConnectionRef(i as u64))
                    .unwrap()
            })
            .collect();
        (game, ids)
    }

    #[test]
    fn test_new_game_is_waiting() {
        let game = Game::new(GameConfig::default());
        assert_eq!(game.phase(), Phase::Waiting);
        assert_eq!(game.day(), 0);
        assert!(game.registry().is_empty());
    }

    #[test]
    fn test_only_host_configures_roles() {
        let (mut game, ids) = lobby(4);
        let roles = vec![RoleCount::new(Role::Villager, 4)];
        let err = game
            .set_role_configuration(ids[1], roles.clone())
            .unwrap_err();
        assert_eq!(err, EngineError::NotHost(ids[1]));
        game.set_role_configuration(ids[0], roles).unwrap();
        assert_eq!(game.role_configuration().len(), 1);
    }

    #[test]
    fn test_start_requires_four_players() {
        let (mut game, ids) = lobby(3);
        game.set_role_configuration(ids[0], vec![RoleCount::new(Role::Villager, 3)])
            .unwrap();
        let err = game.start(ids[0]).unwrap_err();
        assert_eq!(err, EngineError::NotEnoughPlayers { required: 4, actual: 3 });
        assert_eq!(game.phase(), Phase::Waiting);
    }

    #[test]
    fn test_start_requires_configuration() {
        let (mut game, ids) = lobby(4);
        assert_eq!(game.start(ids[0]).unwrap_err(), EngineError::NoRoleConfiguration);
    }

    #[test]
    fn test_start_rejects_count_mismatch() {
        let (mut game, ids) = lobby(4);
        game.set_role_configuration(
            ids[0],
            vec![
                RoleCount::new(Role::Werewolf, 1),
                RoleCount::new(Role::Villager, 2),
            ],
        )
        .unwrap();
        let err = game.start(ids[0]).unwrap_err();
        assert_eq!(err, EngineError::RoleCountMismatch { roles: 3, players: 4 });
        assert_eq!(game.phase(), Phase::Waiting);
    }

    #[test]
    fn test_start_enters_first_night() {
        let (mut game, ids) = lobby(4);
        game.set_role_configuration(
            ids[0],
            vec![
                RoleCount::new(Role::Werewolf, 1),
                RoleCount::new(Role::Seer, 1),
                RoleCount::new(Role::Villager, 2),
            ],
        )
        .unwrap();
        let reveals = game.start(ids[0]).unwrap();
        assert_eq!(reveals.len(), 4);
        assert_eq!(game.phase(), Phase::Night);
        assert_eq!(game.day(), 1);
        let wolf = reveals.iter().find(|r| r.role == Role::Werewolf).unwrap();
        assert!(wolf.wolf_leader);
        assert!(wolf.teammates.is_empty());
    }

    #[test]
    fn test_replayed_deal_becomes_the_configuration() {
        let (mut game, ids) = lobby(4);
        game.set_role_configuration(ids[0], vec![RoleCount::new(Role::Villager, 4)])
            .unwrap();
        game.start_with_roles(
            ids[0],
            vec![Role::Seer, Role::Werewolf, Role::Villager, Role::Villager],
        )
        .unwrap();
        assert_eq!(
            game.role_configuration(),
            &[
                RoleCount::new(Role::Villager, 2),
                RoleCount::new(Role::Werewolf, 1),
                RoleCount::new(Role::Seer, 1),
            ]
        );
        assert_eq!(game.player(ids[0]).unwrap().role, Some(Role::Seer));
    }

    #[test]
    fn test_replayed_deal_checks_host_and_count() {
        let (mut game, ids) = lobby(4);
        assert_eq!(
            game.start_with_roles(ids[1], vec![Role::Villager; 4]).unwrap_err(),
            EngineError::NotHost(ids[1])
        );
        assert_eq!(
            game.start_with_roles(ids[0], vec![Role::Villager; 3]).unwrap_err(),
            EngineError::RoleCountMismatch { roles: 3, players: 4 }
        );
        assert_eq!(game.phase(), Phase::Waiting);
    }

    #[test]
    fn test_register_closed_after_start() {
        let (mut game, ids) = lobby(4);
        game.start_with_roles(ids[0], vec![Role::Villager; 4]).unwrap();
        let err = game.register("late", ConnectionRef(99)).unwrap_err();
        assert_eq!(err, EngineError::WrongPhase(Phase::Night));
    }

    #[test]
    fn test_snapshot_hides_other_roles() {
        let (mut game, ids) = lobby(4);
        game.start_with_roles(
            ids[0],
            vec![Role::Werewolf, Role::Seer, Role::Villager, Role::Villager],
        )
        .unwrap();
        let snap = game.snapshot(Some(ids[1]));
        assert_eq!(snap.player(ids[1]).unwrap().role, Some(Role::Seer));
        assert_eq!(snap.player(ids[0]).unwrap().role, None);
        assert!(!snap.is_host);
        assert!(game.snapshot(Some(ids[0])).is_host);
        assert!(game.snapshot(None).players.iter().all(|p| p.role.is_none()));
    }

    #[test]
    fn test_wolf_chat_reaches_living_wolves_only() {
        let (mut game, ids) = lobby(5);
        game.start_with_roles(
            ids[0],
            vec![
                Role::Werewolf,
                Role::WolfKing,
                Role::Seer,
                Role::Villager,
                Role::Villager,
            ],
        )
        .unwrap();
        let chat = game.wolf_chat(ids[1], "the seer is p2").unwrap();
        assert_eq!(chat.recipients, vec![ids[0], ids[1]]);
        assert_eq!(
            game.wolf_chat(ids[2], "hello?").unwrap_err(),
            EngineError::NotWerewolf(ids[2])
        );
    }

    #[test]
    fn test_unregister_in_lobby_moves_host() {
        let (mut game, ids) = lobby(3);
        let outcome = game.unregister(ids[0]).unwrap();
        assert!(!outcome.resolved);
        assert_eq!(game.host(), Some(ids[1]));
        assert_eq!(
            game.unregister(ids[0]).unwrap_err(),
            EngineError::UnknownPlayer(ids[0])
        );
    }
}
