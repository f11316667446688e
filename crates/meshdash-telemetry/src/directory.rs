//! Candidate peer directory and the saved peer selection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::health_table::PeerHealthRow;
use crate::model::PeerUrl;

/// Public peer registry: `{ group: { peer_uri: {...}, ... }, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateDirectory(pub Map<String, Value>);

impl CandidateDirectory {
    /// All peer URIs, group by group, in the order the registry lists them.
    /// Non-object group values are skipped.
    pub fn peer_ids(&self) -> Vec<String> {
        self.0
            .values()
            .filter_map(Value::as_object)
            .flat_map(|group| group.keys().cloned())
            .collect()
    }
}

/// One selectable row of the peer picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub url: String,
    pub checked: bool,
}

/// Explicit checkbox state of the peer picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerSelection {
    entries: Vec<SelectionEntry>,
}

impl PeerSelection {
    /// One entry per health row, pre-checked when currently connected.
    pub fn from_rows(rows: &[PeerHealthRow]) -> Self {
        Self {
            entries: rows
                .iter()
                .map(|r| SelectionEntry {
                    url: r.peer.clone(),
                    checked: r.connected,
                })
                .collect(),
        }
    }

    /// Set the checkbox for `url`. Returns false when no such entry exists.
    pub fn set_checked(&mut self, url: &str, checked: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.url == url) {
            Some(entry) => {
                entry.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Body of the `PUT api/peers` request.
    pub fn save_body(&self) -> Vec<PeerUrl> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| PeerUrl { url: e.url.clone() })
            .collect()
    }
}
