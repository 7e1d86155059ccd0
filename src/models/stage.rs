//! Stage and group containers for persisted matches.

use crate::models::matches::Match;
use serde::{Deserialize, Serialize};

/// Unique identifier for a stage.
pub type StageId = i64;

/// What kind of stage this is. Only playoff stages take part in bracket
/// advancement; group stages carry their own matches for standings elsewhere.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    Playoff,
    Groups,
}

/// A group inside a group stage, with its own matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// One stage of a tournament: a flat list of matches plus optional groups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub stage_type: StageType,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Stage {
    pub fn new(id: StageId, name: impl Into<String>, stage_type: StageType) -> Self {
        Self {
            id,
            name: name.into(),
            stage_type,
            matches: Vec::new(),
            groups: Vec::new(),
        }
    }
}
