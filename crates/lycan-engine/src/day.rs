//! Day actions: applied immediately, never buffered.

use lycan_protocol::PlayerId;

use crate::{DayActionKind, EngineError, Game, Outcome, Phase};

impl Game {
    /// Applies a knight's duel or a white wolf king's self-destruct.
    ///
    /// Deaths here do not raise revenge. They do shrink the day quorum,
    /// so a duel can complete a day barrier the victim was holding up.
    pub fn submit_day_action(
        &mut self,
        actor: PlayerId,
        kind: DayActionKind,
        target: PlayerId,
    ) -> Result<Outcome, EngineError> {
        self.ensure_phase(Phase::Day)?;
        let role = self.living_actor(actor)?;
        if role.ability() != kind.required_ability() {
            return Err(EngineError::AbilityMismatch {
                role,
                action: kind.verb(),
            });
        }
        if target == actor {
            return Err(EngineError::InvalidTarget(
                "you cannot target yourself".into(),
            ));
        }
        self.living_target(target)?;

        let actor_name = self.registry.name(actor).to_string();
        let target_name = self.registry.name(target).to_string();
        let deaths = match kind {
            DayActionKind::Duel => {
                let loser = if self
                    .registry
                    .get(target)
                    .is_some_and(|p| p.is_werewolf())
                {
                    self.log.push(format!(
                        "Knight {actor_name} won the duel; {target_name} dies."
                    ));
                    target
                } else {
                    self.log.push(format!(
                        "Knight {actor_name} lost the duel against {target_name} and dies."
                    ));
                    actor
                };
                self.registry.kill(loser);
                vec![loser]
            }
            DayActionKind::SelfDestruct => {
                self.registry.kill(target);
                self.registry.kill(actor);
                self.log.push(format!(
                    "White Wolf King {actor_name} self-destructed, taking {target_name} along."
                ));
                vec![target, actor]
            }
        };
        tracing::info!(%actor, %target, ?kind, "day action applied");

        if self.check_winner().is_none() {
            self.advance_if_ready();
        }
        Ok(self.outcome(true, deaths, Vec::new()))
    }
}
