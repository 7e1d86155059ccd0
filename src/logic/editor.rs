//! Per-match mutation coordinator.
//!
//! Replaces the platform's ambient in-flight refs with an explicit object
//! holding the pending score, the expected version token, and the debounce
//! deadline. All time comes in as arguments so callers (and tests) own the
//! clock; the coordinator never sleeps or spawns.

use crate::logic::gating::RoundGating;
use crate::models::{Match, MatchError, MatchId, MatchStatus, PairingId, Role, Score, Side, VersionToken};
use crate::store::{MatchBackend, MatchUpdate};
use chrono::{DateTime, Duration, Utc};

/// Rapid +1/-1 taps within this window coalesce into one write.
pub const DEBOUNCE_WINDOW_MS: i64 = 120;

fn debounce_window() -> Duration {
    Duration::milliseconds(DEBOUNCE_WINDOW_MS)
}

/// Coordinates score edits for a single match on behalf of one caller.
///
/// Within one coordinator mutations are serialized: a flush or submit always
/// completes (success or error) before the next write is composed, because
/// the token for the next write comes out of the previous result.
#[derive(Clone, Debug)]
pub struct MatchEditor {
    match_id: MatchId,
    round: u32,
    goal_limit: u32,
    role: Role,
    status: MatchStatus,
    pairing1_id: Option<PairingId>,
    pairing2_id: Option<PairingId>,
    score: (u32, u32),
    /// Token read before the current change was composed.
    expected_token: VersionToken,
    /// Final coalesced score awaiting flush, if any.
    pending_score: Option<(u32, u32)>,
    /// When the debounce window closes.
    flush_due: Option<DateTime<Utc>>,
}

impl MatchEditor {
    /// Build a coordinator from freshly fetched (and resolved) match state.
    pub fn new(m: &Match, goal_limit: u32, role: Role) -> Self {
        let score = m.score.as_ref().and_then(Score::goals).unwrap_or((0, 0));
        Self {
            match_id: m.id,
            round: m.round,
            goal_limit,
            role,
            status: m.status,
            pairing1_id: m.pairing1_id,
            pairing2_id: m.pairing2_id,
            score,
            expected_token: m.updated_at,
            pending_score: None,
            flush_due: None,
        }
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Local (possibly not yet flushed) score view.
    pub fn score(&self) -> (u32, u32) {
        self.score
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// True once the debounce window has closed and a flush is owed.
    pub fn flush_is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.flush_due, Some(due) if now >= due) && self.pending_score.is_some()
    }

    /// Adopt authoritative state after a re-fetch. Drops any pending edit;
    /// the caller re-applies on top of the fresh token.
    pub fn sync_from(&mut self, m: &Match) {
        debug_assert_eq!(self.match_id, m.id);
        self.status = m.status;
        self.pairing1_id = m.pairing1_id;
        self.pairing2_id = m.pairing2_id;
        self.expected_token = m.updated_at;
        self.score = m.score.as_ref().and_then(Score::goals).unwrap_or((0, 0));
        self.pending_score = None;
        self.flush_due = None;
    }

    fn clamp(&self, value: i64) -> u32 {
        value.clamp(0, i64::from(self.goal_limit)) as u32
    }

    fn ensure_editable(&self, gating: &RoundGating) -> Result<(), MatchError> {
        if !self.role.can_mutate() {
            return Err(MatchError::Unauthorized);
        }
        if self.status == MatchStatus::Disputed {
            return Err(MatchError::DisputeActive);
        }
        if self.round > 0 && gating.is_round_locked(self.round) {
            return Err(MatchError::RoundLocked { round: self.round });
        }
        Ok(())
    }

    /// Queue a +1/-1 on one side. The result is clamped to `[0, goal_limit]`
    /// and coalesced; the token in effect when the first tap of the window
    /// happened is the one the eventual flush will carry.
    pub fn increment(
        &mut self,
        side: Side,
        delta: i32,
        gating: &RoundGating,
        now: DateTime<Utc>,
    ) -> Result<(), MatchError> {
        self.ensure_editable(gating)?;
        let (a, b) = self.score;
        let next = match side {
            Side::A => (self.clamp(i64::from(a) + i64::from(delta)), b),
            Side::B => (a, self.clamp(i64::from(b) + i64::from(delta))),
        };
        if next == self.score {
            return Ok(());
        }
        self.score = next;
        self.pending_score = Some(next);
        self.flush_due = Some(now + debounce_window());
        Ok(())
    }

    /// Send the final coalesced score. No-op when nothing is pending. On a
    /// conflict the authoritative state is re-fetched and the same final
    /// score is retried exactly once with the refreshed token.
    pub fn flush<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        now: DateTime<Utc>,
    ) -> Result<Option<Match>, MatchError> {
        let Some((a, b)) = self.pending_score.take() else {
            return Ok(None);
        };
        self.flush_due = None;
        let update = MatchUpdate {
            score: Some(Score::Goals {
                a,
                b,
                limit: Some(self.goal_limit),
            }),
            expected_updated_at: Some(self.expected_token),
            ..MatchUpdate::default()
        };
        self.post_with_retry(backend, update, now).map(Some)
    }

    /// The canonical explicit write path: submit a full `{a, b}` score.
    pub fn submit_score<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        a: u32,
        b: u32,
        gating: &RoundGating,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        self.ensure_editable(gating)?;
        if a > self.goal_limit || b > self.goal_limit {
            return Err(MatchError::Validation(format!(
                "Score exceeds the goal limit of {}",
                self.goal_limit
            )));
        }
        self.pending_score = None;
        self.flush_due = None;
        let update = MatchUpdate {
            score: Some(Score::Goals {
                a,
                b,
                limit: Some(self.goal_limit),
            }),
            expected_updated_at: Some(self.expected_token),
            ..MatchUpdate::default()
        };
        self.post_with_retry(backend, update, now)
    }

    /// Force a side to win: goal limit for the winner, 0 for the loser,
    /// `Done`. Destructive, so the caller must pass explicit confirmation,
    /// and the forced side must have a pairing assigned.
    pub fn override_winner<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        side: Side,
        confirmed: bool,
        gating: &RoundGating,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        self.ensure_editable(gating)?;
        if !confirmed {
            return Err(MatchError::Validation(
                "Winner override requires explicit confirmation".into(),
            ));
        }
        let winner_pairing = match side {
            Side::A => self.pairing1_id,
            Side::B => self.pairing2_id,
        };
        let Some(winner_pairing) = winner_pairing else {
            return Err(MatchError::Validation(
                "Cannot force a winner on an unassigned slot".into(),
            ));
        };
        let (a, b) = match side {
            Side::A => (self.goal_limit, 0),
            Side::B => (0, self.goal_limit),
        };
        self.pending_score = None;
        self.flush_due = None;
        let update = MatchUpdate {
            score: Some(Score::Goals {
                a,
                b,
                limit: Some(self.goal_limit),
            }),
            status: Some(MatchStatus::Done),
            winner_pairing_id: Some(winner_pairing),
            expected_updated_at: Some(self.expected_token),
            force: true,
        };
        self.post_with_retry(backend, update, now)
    }

    /// Freeze the match as disputed. Requires confirmation; ordinary edits
    /// are rejected until an admin resolves it.
    pub fn mark_disputed<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        confirmed: bool,
        gating: &RoundGating,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        self.ensure_editable(gating)?;
        if !confirmed {
            return Err(MatchError::Validation(
                "Marking a dispute requires explicit confirmation".into(),
            ));
        }
        let update = MatchUpdate {
            status: Some(MatchStatus::Disputed),
            expected_updated_at: Some(self.expected_token),
            force: true,
            ..MatchUpdate::default()
        };
        self.post_with_retry(backend, update, now)
    }

    /// Resolve an open dispute (admin only): back to `InProgress` when goals
    /// are on the board, `Pending` otherwise. The pre-dispute score is not
    /// restored automatically.
    pub fn resolve_dispute<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        if !self.role.can_resolve_dispute() {
            return Err(MatchError::Unauthorized);
        }
        if self.status != MatchStatus::Disputed {
            return Err(MatchError::Validation("Match is not disputed".into()));
        }
        let next = if self.score.0 > 0 || self.score.1 > 0 {
            MatchStatus::InProgress
        } else {
            MatchStatus::Pending
        };
        let update = MatchUpdate {
            status: Some(next),
            expected_updated_at: Some(self.expected_token),
            force: true,
            ..MatchUpdate::default()
        };
        self.post_with_retry(backend, update, now)
    }

    /// Revert the most recent mutation. Fails outside the undo window.
    pub fn undo<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        if !self.role.can_mutate() {
            return Err(MatchError::Unauthorized);
        }
        let m = backend.post_undo(self.match_id, now)?;
        self.sync_from(&m);
        Ok(m)
    }

    /// Apply one write; on a stale token, re-fetch and retry exactly once
    /// with the refreshed token. Never loops.
    fn post_with_retry<B: MatchBackend>(
        &mut self,
        backend: &mut B,
        update: MatchUpdate,
        now: DateTime<Utc>,
    ) -> Result<Match, MatchError> {
        match backend.post_result(self.match_id, update.clone(), self.role, now) {
            Ok(m) => {
                self.sync_from(&m);
                Ok(m)
            }
            Err(MatchError::Conflict) => {
                log::warn!("match {}: stale token, refetching once", self.match_id);
                let fresh = backend.fetch_match(self.match_id)?;
                self.sync_from(&fresh);
                if fresh.status == MatchStatus::Disputed {
                    return Err(MatchError::DisputeActive);
                }
                let retry = MatchUpdate {
                    expected_updated_at: Some(self.expected_token),
                    ..update
                };
                let m = backend.post_result(self.match_id, retry, self.role, now)?;
                self.sync_from(&m);
                Ok(m)
            }
            Err(err) => Err(err),
        }
    }
}
