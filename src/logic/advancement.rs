//! Bracket topology resolution: project decided winners into downstream slots.
//!
//! Advancement is never persisted. Every read of the raw match list re-derives
//! the filled bracket, so the stored records stay the single source of truth.

use crate::models::{Match, MatchStatus, Score, Side, Stage, StageType};
use std::collections::BTreeMap;

/// Winner of a score, if determinate.
///
/// Goals form: when a limit is set, the side whose count equals the limit wins;
/// with no limit the higher side wins and equal counts are indeterminate.
/// Sets form: majority of won sets; a tie is indeterminate.
pub fn winner_side(score: &Score) -> Option<Side> {
    match score {
        Score::Goals { a, b, limit } => {
            if let Some(limit) = limit {
                if a == limit {
                    return Some(Side::A);
                }
                if b == limit {
                    return Some(Side::B);
                }
                return None;
            }
            match a.cmp(b) {
                std::cmp::Ordering::Greater => Some(Side::A),
                std::cmp::Ordering::Less => Some(Side::B),
                std::cmp::Ordering::Equal => None,
            }
        }
        Score::Sets(sets) => {
            let mut a = 0u32;
            let mut b = 0u32;
            for set in sets {
                if set.a > set.b {
                    a += 1;
                } else if set.b > set.a {
                    b += 1;
                }
            }
            match a.cmp(&b) {
                std::cmp::Ordering::Greater => Some(Side::A),
                std::cmp::Ordering::Less => Some(Side::B),
                std::cmp::Ordering::Equal => None,
            }
        }
    }
}

/// Winner pairing of a match: only for `Done` matches with a determinate
/// winner whose slot is filled.
pub fn winner_pairing(m: &Match) -> Option<(Side, i64)> {
    if m.status != MatchStatus::Done {
        return None;
    }
    let side = winner_side(m.score.as_ref()?)?;
    Some((side, m.pairing_on(side)?))
}

/// Compute the advancement view of a playoff match list.
///
/// Match `i` (0-based, ordered by round then id) of round `r` feeds slot
/// `i / 2` of round `r + 1`: slot 1 for even `i`, slot 2 for odd `i`. Already
/// filled downstream slots are never overwritten, so manual seeds stay
/// authoritative and the function is idempotent. Matches with `round == 0`
/// are passed through verbatim; the input is never mutated.
pub fn resolve_advancement(matches: &[Match]) -> Vec<Match> {
    let mut resolved: Vec<Match> = matches.to_vec();

    // Indices into `resolved` per bracket round, in stable (round, id) order.
    let mut by_round: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, m) in resolved.iter().enumerate() {
        if m.round > 0 {
            by_round.entry(m.round).or_default().push(idx);
        }
    }
    for indices in by_round.values_mut() {
        indices.sort_by_key(|&idx| (resolved[idx].round, resolved[idx].id));
    }

    let rounds: Vec<u32> = by_round.keys().copied().collect();
    for pair in rounds.windows(2) {
        let current = by_round[&pair[0]].clone();
        let next = &by_round[&pair[1]];
        for (match_idx, &idx) in current.iter().enumerate() {
            let Some((_, winner)) = winner_pairing(&resolved[idx]) else {
                continue;
            };
            let Some(&target_idx) = next.get(match_idx / 2) else {
                continue;
            };
            let target = &mut resolved[target_idx];
            if match_idx % 2 == 0 {
                if target.pairing1_id.is_none() {
                    target.pairing1_id = Some(winner);
                }
            } else if target.pairing2_id.is_none() {
                target.pairing2_id = Some(winner);
            }
        }
    }

    resolved
}

/// Resolve advancement for a stage. Group stages come back untouched; only
/// playoff stages carry a bracket.
pub fn resolve_stage(stage: &Stage) -> Stage {
    if stage.stage_type != StageType::Playoff {
        return stage.clone();
    }
    let mut resolved = stage.clone();
    resolved.matches = resolve_advancement(&stage.matches);
    resolved
}
