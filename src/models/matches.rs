//! Match record, status, score forms, and the optimistic-concurrency token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a match.
pub type MatchId = i64;

/// Unique identifier for a pairing (participant or team).
pub type PairingId = i64;

/// Opaque monotonically-increasing version marker used for compare-and-swap.
/// Only the store mints new values; callers carry it back unchanged.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(pub i64);

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// Lifecycle state of a match. Wire form matches the platform's
/// `PENDING | SCHEDULED | ...` strings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Live,
    Done,
    Disputed,
    Cancelled,
}

/// One set in sets-form scoring.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub a: u32,
    pub b: u32,
}

/// Score of a match. Goals form is authoritative for bracket advancement;
/// sets form exists for racket-sport stages and only contributes a winner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Score {
    Goals {
        a: u32,
        b: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    },
    Sets(Vec<SetScore>),
}

impl Score {
    /// Goals for both sides, if this is a goals-form score.
    pub fn goals(&self) -> Option<(u32, u32)> {
        match self {
            Score::Goals { a, b, .. } => Some((*a, *b)),
            Score::Sets(_) => None,
        }
    }

    /// True when either side has scored anything.
    pub fn has_points(&self) -> bool {
        match self {
            Score::Goals { a, b, .. } => *a > 0 || *b > 0,
            Score::Sets(sets) => sets.iter().any(|s| s.a > 0 || s.b > 0),
        }
    }
}

/// A single persisted match. `round == 0` means the match is not part of a
/// bracket round (e.g. a group-stage match); bracket rounds start at 1.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    #[serde(default)]
    pub round: u32,
    /// None until the slot is filled by seeding or advancement.
    pub pairing1_id: Option<PairingId>,
    pub pairing2_id: Option<PairingId>,
    pub status: MatchStatus,
    pub score: Option<Score>,
    /// Compare-and-swap key; changes on every successful mutation.
    pub updated_at: VersionToken,
    /// Scheduling metadata, not used by advancement logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
}

impl Match {
    /// New bracket match with empty slots, no score, `Pending` status.
    pub fn new(id: MatchId, round: u32) -> Self {
        Self {
            id,
            round,
            pairing1_id: None,
            pairing2_id: None,
            status: MatchStatus::Pending,
            score: None,
            updated_at: VersionToken::default(),
            court_id: None,
            start_at: None,
        }
    }

    /// New match with both slots seeded.
    pub fn seeded(id: MatchId, round: u32, pairing1: PairingId, pairing2: PairingId) -> Self {
        Self {
            pairing1_id: Some(pairing1),
            pairing2_id: Some(pairing2),
            ..Self::new(id, round)
        }
    }

    /// Pairing occupying the given side, if filled.
    pub fn pairing_on(&self, side: Side) -> Option<PairingId> {
        match side {
            Side::A => self.pairing1_id,
            Side::B => self.pairing2_id,
        }
    }
}
