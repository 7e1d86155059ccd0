//! Data structures for the bracket engine: matches, pairings, stages, config.

mod config;
mod error;
mod matches;
mod pairing;
mod stage;

pub use config::{GoalLimits, ReopenPolicy, Role, TournamentConfig};
pub use error::MatchError;
pub use matches::{Match, MatchId, MatchStatus, PairingId, Score, SetScore, Side, VersionToken};
pub use pairing::{Pairing, PairingDirectory};
pub use stage::{Group, Stage, StageId, StageType};
