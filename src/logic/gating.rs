//! Round gating: which rounds may be edited, derived from a match snapshot.

use crate::models::{Match, MatchStatus, ReopenPolicy};
use std::collections::BTreeMap;

/// Derived, read-only view over one snapshot of the match list. Holds no
/// mutable state; rebuild it after every re-fetch.
#[derive(Clone, Debug)]
pub struct RoundGating {
    by_round: BTreeMap<u32, Vec<MatchStatus>>,
    policy: ReopenPolicy,
}

impl RoundGating {
    pub fn new(matches: &[Match]) -> Self {
        Self::with_policy(matches, ReopenPolicy::default())
    }

    pub fn with_policy(matches: &[Match], policy: ReopenPolicy) -> Self {
        let mut by_round: BTreeMap<u32, Vec<MatchStatus>> = BTreeMap::new();
        for m in matches {
            if m.round > 0 {
                by_round.entry(m.round).or_default().push(m.status);
            }
        }
        Self { by_round, policy }
    }

    /// Distinct bracket rounds present, ascending.
    pub fn rounds(&self) -> Vec<u32> {
        self.by_round.keys().copied().collect()
    }

    /// A round is complete when it has matches and every one is `Done`.
    pub fn is_round_complete(&self, round: u32) -> bool {
        self.by_round
            .get(&round)
            .map(|statuses| !statuses.is_empty() && statuses.iter().all(|s| *s == MatchStatus::Done))
            .unwrap_or(false)
    }

    /// Play has started in this round: some match has moved past scheduling.
    fn round_has_started(&self, round: u32) -> bool {
        self.by_round
            .get(&round)
            .map(|statuses| {
                statuses.iter().any(|s| {
                    !matches!(s, MatchStatus::Pending | MatchStatus::Scheduled | MatchStatus::Cancelled)
                })
            })
            .unwrap_or(false)
    }

    /// A round is locked while any earlier round is incomplete; the first
    /// round is never locked. Completed rounds stay editable (a further edit
    /// is a correction, not blocked here).
    ///
    /// Under `ReopenPolicy::KeepStartedUnlocked`, a downstream round where
    /// play already started is not re-locked when an earlier round is
    /// reopened by a correction.
    pub fn is_round_locked(&self, round: u32) -> bool {
        let rounds = self.rounds();
        let Some(pos) = rounds.iter().position(|&r| r == round) else {
            return false;
        };
        if pos == 0 {
            return false;
        }
        let earlier_incomplete = rounds[..pos].iter().any(|&r| !self.is_round_complete(r));
        if !earlier_incomplete {
            return false;
        }
        match self.policy {
            ReopenPolicy::RelockDownstream => true,
            ReopenPolicy::KeepStartedUnlocked => !self.round_has_started(round),
        }
    }
}
