//! Night: buffered action submission and the fixed-order resolution.

use std::collections::{BTreeMap, BTreeSet};

use lycan_protocol::PlayerId;

use crate::{
    Ability, EngineError, Game, NightAction, NightActionKind, Notice, Outcome,
    Phase, Potion, PrivateNotice, RevengeCause,
};

/// Buffered actions of one kind, in actor order.
fn of_kind(
    actions: &BTreeMap<PlayerId, NightAction>,
    kind: NightActionKind,
) -> impl Iterator<Item = (PlayerId, NightAction)> + '_ {
    actions
        .iter()
        .filter(move |(_, action)| action.kind == kind)
        .map(|(actor, action)| (*actor, *action))
}

impl Game {
    /// Records a night action. A later submission from the same actor
    /// replaces the earlier one.
    ///
    /// # Errors
    /// Wrong phase, dead or unknown actor, an action the role's ability
    /// does not cover, a kill from anyone but the wolf leader, missing or dead targets, or
    /// a potion that is already spent. The buffer is untouched on error.
    pub fn submit_night_action(
        &mut self,
        actor: PlayerId,
        action: NightAction,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::Night)?;
        let role = self.living_actor(actor)?;
        let kind = action.kind;

        if role.ability() != kind.required_ability() {
            return Err(EngineError::AbilityMismatch {
                role,
                action: kind.verb(),
            });
        }
        if kind == NightActionKind::Kill
            && self.registry.wolf_leader() != Some(actor)
        {
            return Err(EngineError::NotWolfLeader(actor));
        }

        let action = self.checked_targets(action)?;

        if let Some(potion) = kind.potion() {
            let available = self
                .registry
                .get(actor)
                .and_then(|p| p.potions)
                .is_some_and(|p| p.has(potion));
            if !available {
                return Err(EngineError::PotionUsed(potion));
            }
        }

        tracing::debug!(%actor, ?kind, "night action recorded");
        self.night_actions.insert(actor, action);
        Ok(())
    }

    fn checked_targets(
        &self,
        action: NightAction,
    ) -> Result<NightAction, EngineError> {
        match action.kind.target_count() {
            0 => Ok(NightAction::new(action.kind, None)),
            1 => {
                let target = action.target.ok_or(EngineError::MissingTarget)?;
                self.living_target(target)?;
                Ok(NightAction::targeting(action.kind, target))
            }
            _ => {
                let first = action.target.ok_or(EngineError::MissingTarget)?;
                let second =
                    action.second_target.ok_or(EngineError::MissingTarget)?;
                self.living_target(first)?;
                self.living_target(second)?;
                if first == second {
                    return Err(EngineError::InvalidTarget(
                        "an exchange needs two different players".into(),
                    ));
                }
                Ok(NightAction::exchange(first, second))
            }
        }
    }

    /// Resolves the buffered night. Called once, when the night barrier
    /// completes.
    pub(crate) fn resolve_night(&mut self) -> Outcome {
        let actions = std::mem::take(&mut self.night_actions);
        let mut notices = Vec::new();

        // 1. Guards.
        let protected: BTreeSet<PlayerId> = of_kind(&actions, NightActionKind::Protect)
            .filter_map(|(_, a)| a.target)
            .collect();

        // 2. The pack's kill: only the leader's submission counts.
        let wolf_target = self
            .registry
            .wolf_leader()
            .and_then(|leader| actions.get(&leader))
            .filter(|a| a.kind == NightActionKind::Kill)
            .and_then(|a| a.target);
        let mut killed = BTreeSet::new();
        if let Some(target) = wolf_target {
            if protected.contains(&target) {
                tracing::debug!(%target, "wolf kill blocked by a guard");
            } else {
                killed.insert(target);
            }
        }

        // 3. Witches hear the raw choice; peekers glimpse it.
        let target_name =
            wolf_target.map(|t| self.registry.name(t).to_string());
        for witch in self.living_with(Ability::Potion) {
            notices.push(PrivateNotice {
                recipient: witch,
                notice: Notice::WolfTarget {
                    target: wolf_target,
                    target_name: target_name.clone(),
                },
            });
        }
        for (peeker, _) in of_kind(&actions, NightActionKind::Peek) {
            notices.push(PrivateNotice {
                recipient: peeker,
                notice: Notice::Peeked {
                    target: wolf_target,
                    target_name: target_name.clone(),
                },
            });
        }

        // 4. Poison.
        for (witch, action) in of_kind(&actions, NightActionKind::Poison) {
            if let Some(target) = action.target {
                killed.insert(target);
            }
            self.spend(witch, Potion::Poison);
        }

        // 5. Antidote.
        for (witch, action) in of_kind(&actions, NightActionKind::Antidote) {
            if let Some(target) = action.target {
                killed.remove(&target);
            }
            self.spend(witch, Potion::Antidote);
        }

        // 6. Seer checks: team only.
        for (seer, action) in of_kind(&actions, NightActionKind::Check) {
            let Some(target) = action.target else { continue };
            let is_werewolf = self
                .registry
                .get(target)
                .is_some_and(|p| p.is_werewolf());
            notices.push(PrivateNotice {
                recipient: seer,
                notice: Notice::CheckResult {
                    target,
                    target_name: self.registry.name(target).to_string(),
                    is_werewolf,
                },
            });
        }

        // 7. Magician swaps.
        for (magician, action) in of_kind(&actions, NightActionKind::Exchange) {
            let (Some(first), Some(second)) = (action.target, action.second_target)
            else {
                continue;
            };
            self.registry.swap_roles(first, second);
            notices.push(PrivateNotice {
                recipient: magician,
                notice: Notice::Exchanged {
                    first,
                    second,
                    message: format!(
                        "Swapped the roles of {} and {}.",
                        self.registry.name(first),
                        self.registry.name(second)
                    ),
                },
            });
        }

        // 8. Deaths. A revenge holder interrupts and the rest wait.
        let victims = self.avengers_first(killed);
        let (dead, interrupted) = self.bury(victims);
        if let Some((avenger, deferred)) = interrupted {
            self.log.push(format!(
                "{} died in the night and may take someone with them.",
                self.describe(avenger)
            ));
            self.raise_revenge(avenger, RevengeCause::Night, deferred);
            return self.outcome(true, dead, notices);
        }

        // 9. Dawn.
        if dead.is_empty() {
            self.log.push("The night ends. It was a peaceful night.");
        } else {
            self.log
                .push(format!("The night ends. {} died.", self.names(&dead)));
        }
        self.enter(Phase::Day);
        self.check_winner();
        self.outcome(true, dead, notices)
    }

    fn living_with(&self, ability: Ability) -> Vec<PlayerId> {
        self.registry
            .living()
            .iter()
            .copied()
            .filter(|id| self.registry.role(*id).is_some_and(|r| r.ability() == ability))
            .collect()
    }

    fn spend(&mut self, witch: PlayerId, potion: Potion) {
        if let Some(potions) = self.registry.potions_mut(witch) {
            potions.consume(potion);
        }
    }
}
