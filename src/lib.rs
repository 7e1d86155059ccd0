//! Live tournament bracket engine: library with models, resolution logic,
//! and the compare-and-swap match store.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    resolve_advancement, resolve_goal_limit, resolve_stage, winner_pairing, winner_side,
    MatchEditor, RoundGating, DEBOUNCE_WINDOW_MS, FALLBACK_GOAL_LIMIT,
};
pub use models::{
    GoalLimits, Group, Match, MatchError, MatchId, MatchStatus, Pairing, PairingDirectory,
    PairingId, ReopenPolicy, Role, Score, SetScore, Side, Stage, StageId, StageType,
    TournamentConfig, VersionToken,
};
pub use store::{MatchBackend, MatchStore, MatchUpdate, UNDO_WINDOW_MS};
