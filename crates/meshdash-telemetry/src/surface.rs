//! The rendering surface the dashboard writes into.
//!
//! The engine never reads back from the surface. [`MemorySurface`] keeps a
//! plain copy of everything written, applying health-row placements exactly
//! as a DOM table would.

use crate::connectivity::ConnectivityStatus;
use crate::health_table::{PeerHealthRow, Placement};
use crate::model::SelfInfo;
use crate::peers_view::PeerLine;
use crate::rate::RateText;

/// Output side of the dashboard.
pub trait DisplaySurface {
    /// Show `status` and hide every other indicator.
    fn show_status(&mut self, status: ConnectivityStatus);

    /// Replace the connected-peers panel.
    fn show_connected_peers(&mut self, lines: &[PeerLine]);

    /// Replace the connected-peers panel with an error message.
    fn show_peers_error(&mut self, message: &str);

    /// Apply one upsert to the health table.
    fn place_health_row(&mut self, row: &PeerHealthRow, placement: Placement);

    /// Refresh a row in place (connected flag changed).
    fn update_health_row(&mut self, index: usize, row: &PeerHealthRow);

    fn show_rates(&mut self, rates: &RateText);

    fn show_self_info(&mut self, info: &SelfInfo);

    /// Self info could not be fetched.
    fn show_self_error(&mut self, message: &str);

    /// Re-render only the coordinates.
    fn show_coords(&mut self, coords_text: &str);

    /// Peer picker opened for a fresh probe round.
    fn open_peer_picker(&mut self) {}

    /// Drop everything rendered (reconnect).
    fn clear(&mut self);
}

/// In-memory surface, used by tests and as the backing store of other
/// surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySurface {
    pub status: Option<ConnectivityStatus>,
    pub peer_lines: Vec<PeerLine>,
    pub peers_error: Option<String>,
    pub health_rows: Vec<PeerHealthRow>,
    pub rates: Option<RateText>,
    pub self_info: Option<SelfInfo>,
    pub self_error: Option<String>,
    pub coords: Option<String>,
    pub picker_open: bool,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peer ids of the rendered health table, top to bottom.
    pub fn health_order(&self) -> Vec<&str> {
        self.health_rows.iter().map(|r| r.peer.as_str()).collect()
    }

    /// Indicators currently visible. Never more than one.
    pub fn visible_indicators(&self) -> Vec<&'static str> {
        ConnectivityStatus::ALL
            .iter()
            .filter(|s| Some(**s) == self.status)
            .map(|s| s.indicator_id())
            .collect()
    }
}

impl DisplaySurface for MemorySurface {
    fn show_status(&mut self, status: ConnectivityStatus) {
        self.status = Some(status);
    }

    fn show_connected_peers(&mut self, lines: &[PeerLine]) {
        self.peer_lines = lines.to_vec();
        self.peers_error = None;
    }

    fn show_peers_error(&mut self, message: &str) {
        self.peer_lines.clear();
        self.peers_error = Some(message.to_string());
    }

    fn place_health_row(&mut self, row: &PeerHealthRow, placement: Placement) {
        // Out-of-range indices mean the mirror was cleared behind the table
        match placement {
            Placement::Inserted { at } => {
                let at = at.min(self.health_rows.len());
                self.health_rows.insert(at, row.clone());
            }
            Placement::Unchanged { at } => match self.health_rows.get_mut(at) {
                Some(slot) => *slot = row.clone(),
                None => self.health_rows.push(row.clone()),
            },
            Placement::Moved { from, to } => {
                if from < self.health_rows.len() {
                    self.health_rows.remove(from);
                }
                let to = to.min(self.health_rows.len());
                self.health_rows.insert(to, row.clone());
            }
        }
    }

    fn update_health_row(&mut self, index: usize, row: &PeerHealthRow) {
        if let Some(slot) = self.health_rows.get_mut(index) {
            *slot = row.clone();
        }
    }

    fn show_rates(&mut self, rates: &RateText) {
        self.rates = Some(rates.clone());
    }

    fn show_self_info(&mut self, info: &SelfInfo) {
        self.coords = Some(info.coords_text());
        self.self_info = Some(info.clone());
        self.self_error = None;
    }

    fn show_self_error(&mut self, message: &str) {
        self.self_error = Some(message.to_string());
    }

    fn show_coords(&mut self, coords_text: &str) {
        self.coords = Some(coords_text.to_string());
    }

    fn open_peer_picker(&mut self) {
        self.picker_open = true;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
