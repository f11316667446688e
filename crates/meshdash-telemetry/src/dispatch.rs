//! Event dispatcher: one ordered channel of tagged frames, one loop.
//!
//! Each frame is parsed and applied to completion before the next one is
//! received. A frame that fails to parse is logged and skipped.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dashboard::Dashboard;
use crate::events::{EventKind, MeshEvent, RawEvent};
use crate::surface::DisplaySurface;

/// Counters kept by the dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub applied: u64,
    pub skipped: u64,
    pub health: u64,
    pub peers: u64,
    pub rxtx: u64,
    pub coord: u64,
}

impl DispatchStats {
    fn record(&mut self, kind: EventKind) {
        self.applied += 1;
        match kind {
            EventKind::Health => self.health += 1,
            EventKind::Peers => self.peers += 1,
            EventKind::Rxtx => self.rxtx += 1,
            EventKind::Coord => self.coord += 1,
        }
    }
}

/// Routes raw stream frames to the dashboard.
#[derive(Debug, Default)]
pub struct Dispatcher {
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and apply one frame. Returns false if it was skipped.
    pub fn dispatch<S: DisplaySurface>(
        &mut self,
        dashboard: &mut Dashboard<S>,
        raw: &RawEvent,
    ) -> bool {
        match MeshEvent::decode(raw) {
            Ok(event) => {
                debug!(kind = %raw.kind, id = ?raw.id, "dispatching event");
                dashboard.apply(event);
                self.stats.record(raw.kind);
                true
            }
            Err(e) => {
                warn!(kind = %raw.kind, id = ?raw.id, error = %e, "skipping malformed event");
                self.stats.skipped += 1;
                false
            }
        }
    }

    /// Drain `events` until every sender is dropped.
    pub async fn run<S: DisplaySurface>(
        &mut self,
        dashboard: &mut Dashboard<S>,
        events: &mut mpsc::Receiver<RawEvent>,
    ) -> DispatchStats {
        while let Some(raw) = events.recv().await {
            self.dispatch(dashboard, &raw);
        }
        info!(applied = self.stats.applied, skipped = self.stats.skipped, "event stream closed");
        self.stats
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}
