//! Tournament-level configuration: goal limits, caller roles, reopen policy.

use crate::models::matches::{MatchId, PairingId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Winning-score thresholds: a sparse per-round override map on top of a
/// tournament default.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalLimits {
    #[serde(default)]
    pub default_limit: Option<u32>,
    #[serde(default)]
    pub round_limits: HashMap<u32, u32>,
}

impl GoalLimits {
    pub fn with_default(limit: u32) -> Self {
        Self {
            default_limit: Some(limit),
            round_limits: HashMap::new(),
        }
    }

    pub fn with_round_limit(mut self, round: u32, limit: u32) -> Self {
        self.round_limits.insert(round, limit);
        self
    }
}

/// What happens to downstream rounds when an already-complete round is
/// reopened by a correction. The platform never pinned this down, so it is a
/// policy choice per tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReopenPolicy {
    /// Reopening round r re-locks round r+1 until r is complete again.
    #[default]
    RelockDownstream,
    /// Downstream rounds where play already started stay editable.
    KeepStartedUnlocked,
}

/// Privilege level of the caller issuing a mutation.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    #[default]
    Staff,
    Admin,
}

impl Role {
    /// May edit scores and statuses at all.
    pub fn can_mutate(self) -> bool {
        self >= Role::Staff
    }

    /// May resolve an open dispute.
    pub fn can_resolve_dispute(self) -> bool {
        self >= Role::Admin
    }
}

/// Per-tournament configuration, read separately from match data.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    #[serde(default)]
    pub goal_limits: GoalLimits,
    /// Manual "featured match" pointer; owned by the view layer, carried here
    /// so config round-trips intact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_match_id: Option<MatchId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion_pairing_id: Option<PairingId>,
    #[serde(default)]
    pub reopen_policy: ReopenPolicy,
}
