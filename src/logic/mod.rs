//! Bracket engine logic: advancement, gating, goal limits, the match editor.

mod advancement;
mod editor;
mod gating;
mod goal_limit;

pub use advancement::{resolve_advancement, resolve_stage, winner_pairing, winner_side};
pub use editor::{MatchEditor, DEBOUNCE_WINDOW_MS};
pub use gating::RoundGating;
pub use goal_limit::{resolve_goal_limit, FALLBACK_GOAL_LIMIT};
