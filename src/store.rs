//! Authoritative match store: compare-and-swap writes, status recomputation,
//! and the bounded undo log.
//!
//! In production this sits behind an external data store; the in-memory
//! implementation here carries the full write contract so the engine and its
//! callers can be exercised against it.

use crate::logic::winner_side;
use crate::models::{
    Match, MatchError, MatchId, MatchStatus, PairingId, Role, Score, VersionToken,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How long after a mutation its undo stays available.
pub const UNDO_WINDOW_MS: i64 = 60 * 1000;

fn undo_window() -> Duration {
    Duration::milliseconds(UNDO_WINDOW_MS)
}

/// One mutation request against a match. `expected_updated_at` must be the
/// token read before composing the change; `force` marks deliberate overrides
/// (forced winner, dispute transitions) that bypass natural score progression.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_pairing_id: Option<PairingId>,
    #[serde(default)]
    pub expected_updated_at: Option<VersionToken>,
    #[serde(default)]
    pub force: bool,
}

/// Collaborator boundary for reads and writes of match state. The live view
/// and the match editor only ever talk to this; tests substitute faulty or
/// concurrent implementations.
pub trait MatchBackend {
    /// Raw, unresolved match list for the stage.
    fn matches(&self) -> Result<Vec<Match>, MatchError>;
    /// Authoritative state of a single match.
    fn fetch_match(&self, id: MatchId) -> Result<Match, MatchError>;
    /// Apply a mutation under compare-and-swap semantics.
    fn post_result(
        &mut self,
        id: MatchId,
        update: MatchUpdate,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError>;
    /// Revert the most recent mutation, inside the undo window only.
    fn post_undo(&mut self, id: MatchId, now: DateTime<Utc>) -> Result<Match, MatchError>;
}

/// Snapshot taken before a successful mutation, replayed by undo.
#[derive(Clone, Debug)]
struct UndoEntry {
    score: Option<Score>,
    status: MatchStatus,
    recorded_at: DateTime<Utc>,
}

/// In-memory store for one stage's matches.
#[derive(Debug, Default)]
pub struct MatchStore {
    matches: HashMap<MatchId, Match>,
    order: Vec<MatchId>,
    undo_log: HashMap<MatchId, UndoEntry>,
    token_counter: i64,
}

impl MatchStore {
    /// Seed the store with matches created by the external draw. Every match
    /// gets a fresh token; scores and statuses are kept as given.
    pub fn new(matches: Vec<Match>) -> Self {
        let mut store = Self::default();
        for mut m in matches {
            store.token_counter += 1;
            m.updated_at = VersionToken(store.token_counter);
            store.order.push(m.id);
            store.matches.insert(m.id, m);
        }
        store
    }

    fn mint_token(&mut self) -> VersionToken {
        self.token_counter += 1;
        VersionToken(self.token_counter)
    }

    /// A stale-token write that changes nothing (duplicate submission) is
    /// treated as success, not surfaced as a conflict.
    fn is_idempotent_duplicate(current: &Match, update: &MatchUpdate) -> bool {
        let score_same = match &update.score {
            Some(score) => current.score.as_ref() == Some(score),
            None => true,
        };
        let status_same = match update.status {
            Some(status) => current.status == status,
            None => true,
        };
        if update.score.is_none() && update.status.is_none() {
            return false;
        }
        score_same && status_same
    }

    /// Status the store derives from a goals-form score: reaching the limit
    /// finishes the match, any goals put it in progress, otherwise the
    /// previous status stands.
    fn derive_status(previous: MatchStatus, score: &Score) -> MatchStatus {
        if let Score::Goals { limit: Some(_), .. } = score {
            if winner_side(score).is_some() {
                return MatchStatus::Done;
            }
        }
        if score.has_points() {
            return MatchStatus::InProgress;
        }
        previous
    }

    fn validate_score(score: &Score) -> Result<(), MatchError> {
        if let Score::Goals {
            a,
            b,
            limit: Some(limit),
        } = score
        {
            if a > limit || b > limit {
                return Err(MatchError::Validation(format!(
                    "Score exceeds the goal limit of {limit}"
                )));
            }
            if a == limit && b == limit {
                return Err(MatchError::Validation(
                    "Both sides cannot reach the goal limit".into(),
                ));
            }
        }
        Ok(())
    }

    fn apply_update(
        &mut self,
        id: MatchId,
        update: MatchUpdate,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        if !role.can_mutate() {
            return Err(MatchError::Unauthorized);
        }
        let current = self
            .matches
            .get(&id)
            .cloned()
            .ok_or(MatchError::NotFound(id))?;

        let expected = update
            .expected_updated_at
            .ok_or_else(|| MatchError::Validation("Missing expectedUpdatedAt token".into()))?;
        if expected != current.updated_at {
            if Self::is_idempotent_duplicate(&current, &update) {
                return Ok(current);
            }
            return Err(MatchError::Conflict);
        }

        let resolves_dispute = current.status == MatchStatus::Disputed
            && matches!(
                update.status,
                Some(MatchStatus::Pending) | Some(MatchStatus::InProgress)
            );
        if current.status == MatchStatus::Disputed {
            if !resolves_dispute {
                return Err(MatchError::DisputeActive);
            }
            if !role.can_resolve_dispute() {
                return Err(MatchError::Unauthorized);
            }
        }

        if update.status == Some(MatchStatus::Disputed) {
            if current.status == MatchStatus::Cancelled {
                return Err(MatchError::Validation(
                    "Cancelled matches cannot be disputed".into(),
                ));
            }
            return Ok(self.commit(current, None, MatchStatus::Disputed, now));
        }

        let mut next_score = current.score.clone();
        let mut next_status = update.status.unwrap_or(current.status);

        if let Some(score) = update.score.clone() {
            Self::validate_score(&score)?;
            if update.status.is_none() || !update.force {
                // The store's recomputation is authoritative for ordinary
                // score submissions.
                next_status = Self::derive_status(current.status, &score);
            }
            next_score = Some(score);
        }

        if next_status == MatchStatus::Done {
            let winner = next_score.as_ref().and_then(winner_side);
            let Some(winner) = winner else {
                return Err(MatchError::Validation(
                    "A match can only finish with a determinate winner".into(),
                ));
            };
            // Downstream slots are filled on read, not persisted, so a stored
            // pairing may legitimately be absent here. When one is stored it
            // must agree with any claimed winner.
            let stored_pairing = current.pairing_on(winner);
            if let (Some(claimed), Some(stored)) = (update.winner_pairing_id, stored_pairing) {
                if claimed != stored {
                    return Err(MatchError::Validation(
                        "winnerPairingId does not occupy the winning side".into(),
                    ));
                }
            }
        }

        let next_score_opt = if update.score.is_some() {
            Some(next_score)
        } else {
            None
        };
        Ok(self.commit(current, next_score_opt, next_status, now))
    }

    /// Write the new state, bump the token, and record the undo snapshot.
    fn commit(
        &mut self,
        previous: Match,
        score: Option<Option<Score>>,
        status: MatchStatus,
        now: DateTime<Utc>,
    ) -> Match {
        let token = self.mint_token();
        self.undo_log.insert(
            previous.id,
            UndoEntry {
                score: previous.score.clone(),
                status: previous.status,
                recorded_at: now,
            },
        );
        let entry = self.matches.get_mut(&previous.id).expect("match exists");
        if let Some(score) = score {
            entry.score = score;
        }
        entry.status = status;
        entry.updated_at = token;
        log::debug!(
            "match {} -> {:?} (token {})",
            previous.id,
            entry.status,
            token.0
        );
        entry.clone()
    }
}

impl MatchBackend for MatchStore {
    fn matches(&self) -> Result<Vec<Match>, MatchError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.matches.get(id).cloned())
            .collect())
    }

    fn fetch_match(&self, id: MatchId) -> Result<Match, MatchError> {
        self.matches.get(&id).cloned().ok_or(MatchError::NotFound(id))
    }

    fn post_result(
        &mut self,
        id: MatchId,
        update: MatchUpdate,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        self.apply_update(id, update, role, now)
    }

    fn post_undo(&mut self, id: MatchId, now: DateTime<Utc>) -> Result<Match, MatchError> {
        if !self.matches.contains_key(&id) {
            return Err(MatchError::NotFound(id));
        }
        let entry = self.undo_log.get(&id).ok_or(MatchError::UndoUnavailable)?;
        if now - entry.recorded_at > undo_window() {
            return Err(MatchError::UndoExpired);
        }
        let entry = self.undo_log.remove(&id).expect("entry exists");
        let token = self.mint_token();
        let m = self.matches.get_mut(&id).expect("match exists");
        m.score = entry.score;
        m.status = entry.status;
        m.updated_at = token;
        log::info!("match {id} reverted to {:?} (token {})", m.status, token.0);
        Ok(m.clone())
    }
}
