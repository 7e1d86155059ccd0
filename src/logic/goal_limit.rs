//! Goal-limit resolution: winning-score threshold per round.

use crate::models::GoalLimits;

/// Fallback when neither a round override nor a tournament default exists.
pub const FALLBACK_GOAL_LIMIT: u32 = 3;

/// Winning-score threshold for a round: the sparse per-round override wins,
/// then the tournament default, then the hard fallback. `round == 0` (not a
/// bracket round) only ever sees the default.
pub fn resolve_goal_limit(round: u32, limits: &GoalLimits) -> u32 {
    if round > 0 {
        if let Some(&limit) = limits.round_limits.get(&round) {
            return limit;
        }
    }
    limits.default_limit.unwrap_or(FALLBACK_GOAL_LIMIT)
}
