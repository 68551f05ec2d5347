//! Voting: one ballot per eligible voter, plurality with ties.

use std::collections::BTreeMap;

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Ability, EngineError, Game, Outcome, Phase, RevengeCause};

/// Result of counting ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tally {
    NoVotes,
    Elected { target: PlayerId, votes: usize },
    Tie { candidates: Vec<PlayerId>, votes: usize },
}

/// Counts ballots, one entry per vote cast.
pub fn tally<I>(ballots: I) -> Tally
where
    I: IntoIterator<Item = PlayerId>,
{
    let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
    for target in ballots {
        *counts.entry(target).or_default() += 1;
    }
    let Some(max) = counts.values().copied().max() else {
        return Tally::NoVotes;
    };
    let candidates: Vec<PlayerId> = counts
        .into_iter()
        .filter(|(_, n)| *n == max)
        .map(|(target, _)| target)
        .collect();
    match candidates.as_slice() {
        [only] => Tally::Elected {
            target: *only,
            votes: max,
        },
        _ => Tally::Tie {
            candidates,
            votes: max,
        },
    }
}

impl Game {
    /// Casts or replaces `voter`'s ballot.
    pub fn submit_vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::Voting)?;
        self.living_voter(voter)?;
        self.living_target(target)?;
        self.votes.insert(voter, target);
        Ok(())
    }

    pub(crate) fn resolve_votes(&mut self) -> Outcome {
        let votes = std::mem::take(&mut self.votes);
        let ballots = votes
            .iter()
            .filter(|(voter, target)| {
                self.registry.is_alive(**voter) && self.registry.is_alive(**target)
            })
            .map(|(_, target)| *target)
            .collect::<Vec<_>>();

        let mut deaths = Vec::new();
        match tally(ballots) {
            Tally::NoVotes => {
                self.day += 1;
                self.enter(Phase::Night);
                self.log.push(format!(
                    "No one voted. Night {} falls...",
                    self.day
                ));
                return self.outcome(true, deaths, Vec::new());
            }
            Tally::Tie { .. } => {
                self.log.push("The vote is tied; no one is out.");
            }
            Tally::Elected { target, votes } => {
                let ability = self.registry.role(target).map(|r| r.ability());
                tracing::info!(%target, votes, "player voted out");
                match ability {
                    Some(Ability::SurviveVote) => {
                        self.registry.revoke_vote(target);
                        self.log.push(format!(
                            "{} was voted out but survives, losing the right to vote.",
                            self.describe(target)
                        ));
                    }
                    Some(a) if a.raises_revenge() => {
                        self.registry.kill(target);
                        self.log.push(format!(
                            "{} was voted out and may take someone with them.",
                            self.describe(target)
                        ));
                        self.raise_revenge(target, RevengeCause::Day, Vec::new());
                        return self.outcome(true, vec![target], Vec::new());
                    }
                    _ => {
                        self.registry.kill(target);
                        deaths.push(target);
                        self.log.push(format!(
                            "{} was voted out.",
                            self.describe(target)
                        ));
                    }
                }
            }
        }

        self.day += 1;
        self.enter(Phase::Night);
        self.log.push(format!("Night {} falls...", self.day));
        self.check_winner();
        self.outcome(true, deaths, Vec::new())
    }
}
