//! Phases, confirmation barriers, and the revenge marker.

use std::collections::BTreeSet;
use std::fmt;

use lycan_protocol::PlayerId;
use serde::{Deserialize, Serialize};

/// The phase a game is in.
///
/// ```text
/// Waiting → Night → Day → Voting → Night → … → Ended
///             │                │
///             └─→ WolfKingRevenge ←─┘   (resumes into the phase the cause names)
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Waiting,
    Night,
    Day,
    Voting,
    WolfKingRevenge,
    Ended,
}

impl Phase {
    /// Returns `true` once a game is over. Nothing mutates it afterwards.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns `true` between a successful start and the end of the game.
    pub fn is_in_progress(self) -> bool {
        !matches!(self, Self::Waiting | Self::Ended)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Night => write!(f, "night"),
            Self::Day => write!(f, "day"),
            Self::Voting => write!(f, "voting"),
            Self::WolfKingRevenge => write!(f, "wolf_king_revenge"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Which resolution raised a revenge. Fixed when the revenge is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevengeCause {
    /// Raised by the vote tally.
    Day,
    /// Raised by night resolution.
    Night,
}

impl RevengeCause {
    /// The phase play resumes in once the revenge resolves without a winner.
    pub fn resume_phase(self) -> Phase {
        match self {
            Self::Day => Phase::Day,
            Self::Night => Phase::Night,
        }
    }
}

/// An outstanding forced-kill interrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRevenge {
    /// The player who died and now picks a target.
    pub avenger: PlayerId,
    pub cause: RevengeCause,
    /// Victims of the same resolution whose deaths wait for the revenge.
    pub deferred: Vec<PlayerId>,
}

/// A quorum gate: satisfied once every required player has confirmed.
///
/// Set semantics, so a repeated confirmation is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Barrier {
    confirmed: BTreeSet<PlayerId>,
}

impl Barrier {
    /// Records a confirmation. Returns `false` if it was already recorded.
    pub fn confirm(&mut self, player: PlayerId) -> bool {
        self.confirmed.insert(player)
    }

    pub fn withdraw(&mut self, player: PlayerId) {
        self.confirmed.remove(&player);
    }

    /// Returns `true` when everyone in `quorum` has confirmed.
    pub fn is_satisfied(&self, quorum: &BTreeSet<PlayerId>) -> bool {
        quorum.is_subset(&self.confirmed)
    }

    /// How many of `quorum` have not confirmed yet.
    pub fn outstanding(&self, quorum: &BTreeSet<PlayerId>) -> usize {
        quorum.difference(&self.confirmed).count()
    }

    pub fn clear(&mut self) {
        self.confirmed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quorum(ids: &[u64]) -> BTreeSet<PlayerId> {
        ids.iter().map(|&i| PlayerId(i)).collect()
    }

    #[test]
    fn test_barrier_needs_everyone() {
        let q = quorum(&[1, 2, 3]);
        let mut barrier = Barrier::default();
        barrier.confirm(PlayerId(1));
        barrier.confirm(PlayerId(2));
        assert!(!barrier.is_satisfied(&q));
        assert_eq!(barrier.outstanding(&q), 1);
        barrier.confirm(PlayerId(3));
        assert!(barrier.is_satisfied(&q));
    }

    #[test]
    fn test_barrier_confirm_is_idempotent() {
        let q = quorum(&[1, 2]);
        let mut barrier = Barrier::default();
        assert!(barrier.confirm(PlayerId(1)));
        assert!(!barrier.confirm(PlayerId(1)));
        assert!(!barrier.is_satisfied(&q));
    }

    #[test]
    fn test_barrier_satisfied_when_quorum_shrinks() {
        let mut barrier = Barrier::default();
        barrier.confirm(PlayerId(1));
        assert!(!barrier.is_satisfied(&quorum(&[1, 2])));
        assert!(barrier.is_satisfied(&quorum(&[1])));
    }

    #[test]
    fn test_revenge_resumes_into_cause() {
        assert_eq!(RevengeCause::Day.resume_phase(), Phase::Day);
        assert_eq!(RevengeCause::Night.resume_phase(), Phase::Night);
    }

    #[test]
    fn test_phase_display_matches_serde() {
        for phase in [
            Phase::Waiting,
            Phase::Night,
            Phase::Day,
            Phase::Voting,
            Phase::WolfKingRevenge,
            Phase::Ended,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }
}
