//! Error taxonomy for match mutations.

use crate::models::matches::MatchId;

/// Errors that can occur while mutating match state. Conflicts are recoverable
/// by refetching; validation and authorization failures are not retried.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchError {
    /// The supplied version token is stale; refetch and retry once at most.
    Conflict,
    /// The request was invalid before any write was attempted.
    Validation(String),
    /// The match is disputed; ordinary edits are frozen until resolved.
    DisputeActive,
    /// The round's input matches are not complete yet.
    RoundLocked { round: u32 },
    /// Caller's role does not permit this operation.
    Unauthorized,
    /// No match with this id.
    NotFound(MatchId),
    /// The undo window has passed.
    UndoExpired,
    /// There is no recorded mutation to undo.
    UndoUnavailable,
    /// Transport or unknown failure; state must be assumed unchanged.
    Transport(String),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::Conflict => write!(f, "Match was updated by someone else"),
            MatchError::Validation(msg) => write!(f, "{msg}"),
            MatchError::DisputeActive => {
                write!(f, "Match is disputed; resolve the dispute before editing")
            }
            MatchError::RoundLocked { round } => {
                write!(f, "Round {round} is locked until earlier rounds complete")
            }
            MatchError::Unauthorized => write!(f, "Caller is not allowed to do this"),
            MatchError::NotFound(id) => write!(f, "Match {id} not found"),
            MatchError::UndoExpired => write!(f, "Undo window has expired"),
            MatchError::UndoUnavailable => write!(f, "Nothing to undo"),
            MatchError::Transport(msg) => write!(f, "Request failed: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}
