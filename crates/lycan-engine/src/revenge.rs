//! The revenge interrupt raised when a wolf king dies.

use lycan_protocol::PlayerId;

use crate::{EngineError, Game, Outcome, RevengeCause};

impl Game {
    /// Fires the pending revenge at `target`.
    ///
    /// A dead or unknown target wastes the shot. Victims deferred by the
    /// interrupt die now; if one of them also carries a revenge ability the
    /// chain continues with a fresh revenge under the same cause. Once the
    /// chain ends the winner is checked and play resumes in the phase the
    /// cause names.
    pub fn resolve_revenge(
        &mut self,
        target: PlayerId,
    ) -> Result<Outcome, EngineError> {
        if self.phase.is_terminal() {
            return Err(EngineError::GameOver);
        }
        let pending = self.revenge.take().ok_or(EngineError::NoPendingRevenge)?;

        let shot = self.registry.is_alive(target);
        let mut victims = Vec::new();
        if shot {
            victims.push(target);
        }
        victims.extend(
            self.avengers_first(
                pending.deferred.iter().copied().filter(|id| *id != target),
            ),
        );
        let (dead, chained) = self.bury(victims);

        let avenger = self.registry.name(pending.avenger).to_string();
        if shot {
            self.log.push(format!(
                "{avenger} took {} down with them.",
                self.registry.name(target)
            ));
        } else {
            self.log.push(format!("{avenger}'s revenge found no one."));
        }
        let collateral: Vec<PlayerId> =
            dead.iter().copied().filter(|id| *id != target).collect();
        tracing::info!(
            avenger = %pending.avenger,
            %target,
            shot,
            collateral = collateral.len(),
            "revenge resolved"
        );

        if let Some((next, deferred)) = chained {
            let earlier: Vec<PlayerId> =
                collateral.iter().copied().filter(|id| *id != next).collect();
            if !earlier.is_empty() {
                self.log.push(format!("{} also died.", self.names(&earlier)));
            }
            self.log.push(format!(
                "{} died and may take someone with them.",
                self.describe(next)
            ));
            self.raise_revenge(next, pending.cause, deferred);
            return Ok(self.outcome(true, dead, Vec::new()));
        }
        if !collateral.is_empty() {
            self.log
                .push(format!("{} also died.", self.names(&collateral)));
        }

        if self.check_winner().is_none() {
            let resume = pending.cause.resume_phase();
            self.enter(resume);
            match pending.cause {
                RevengeCause::Night => self
                    .log
                    .push(format!("Night {} continues...", self.day)),
                RevengeCause::Day => {
                    self.log.push(format!("Day {} resumes.", self.day))
                }
            }
        }
        Ok(self.outcome(true, dead, Vec::new()))
    }
}
