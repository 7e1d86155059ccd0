//! Pairing display metadata and the read-only directory lookup.

use crate::models::matches::PairingId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display metadata for a pairing (a participant or team). Owned by the
/// external roster collaborator; immutable from this crate's point of view.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    pub id: PairingId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Pairing {
    pub fn new(id: PairingId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            sub_label: None,
            avatar_url: None,
        }
    }
}

/// Read-only lookup of pairing display metadata by id.
#[derive(Clone, Debug, Default)]
pub struct PairingDirectory {
    by_id: HashMap<PairingId, Pairing>,
}

impl PairingDirectory {
    pub fn new(pairings: Vec<Pairing>) -> Self {
        Self {
            by_id: pairings.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn get(&self, id: PairingId) -> Option<&Pairing> {
        self.by_id.get(&id)
    }

    /// Display label, falling back to `#<id>` for unknown pairings.
    pub fn label(&self, id: PairingId) -> String {
        self.by_id
            .get(&id)
            .map(|p| p.label.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
