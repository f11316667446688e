//! The coordinating object that owns all reconciled state.
//!
//! Every handler recomputes its derived output from stored state, never from
//! event history, so a `peers` snapshot and `health` events converge to the
//! same view whatever order they arrive in.

use tracing::{debug, warn};

use crate::events::MeshEvent;
use crate::health_table::PeerHealthTable;
use crate::model::{coords_text, ConnectedPeer, PeerProbeResult, RateSample, SelfInfo};
use crate::peers_view::{ConnectedPeersView, PeersUpdate};
use crate::rate::RateTracker;
use crate::surface::DisplaySurface;

/// Reconciled dashboard state plus the surface it renders into.
#[derive(Debug)]
pub struct Dashboard<S> {
    health: PeerHealthTable,
    peers: ConnectedPeersView,
    rates: RateTracker,
    self_info: Option<SelfInfo>,
    surface: S,
}

impl<S: DisplaySurface> Dashboard<S> {
    pub fn new(surface: S) -> Self {
        Self {
            health: PeerHealthTable::new(),
            peers: ConnectedPeersView::new(),
            rates: RateTracker::new(),
            self_info: None,
            surface,
        }
    }

    /// Apply one parsed stream event.
    pub fn apply(&mut self, event: MeshEvent) {
        match event {
            MeshEvent::Health(probe) => self.upsert_probe(probe),
            MeshEvent::Peers(Some(peers)) => self.replace_peers(peers),
            MeshEvent::Peers(None) => self.peers_fetch_failed("no peer data"),
            MeshEvent::Rxtx(sample) => self.sample_rates(sample),
            MeshEvent::Coord(coords) => self.update_coords(coords),
        }
    }

    pub fn upsert_probe(&mut self, probe: PeerProbeResult) {
        let placement = self.health.upsert(probe);
        let row = &self.health.rows()[placement.index()];
        debug!(peer = %row.peer, latency = %row.latency_text(), ?placement, "health row");
        self.surface.place_health_row(row, placement);
    }

    /// Wholesale replacement of the connected-peers snapshot.
    pub fn replace_peers(&mut self, peers: Vec<ConnectedPeer>) {
        let update = self.peers.replace(peers);
        self.render_peers(&update);
        self.surface.show_connected_peers(&update.lines);
    }

    /// The snapshot could not be fetched: clear the view and show `message`.
    pub fn peers_fetch_failed(&mut self, message: &str) {
        warn!(error = message, "connected peers unavailable");
        let update = self.peers.clear();
        self.render_peers(&update);
        self.surface.show_peers_error(message);
    }

    pub fn sample_rates(&mut self, sample: Option<RateSample>) {
        if let Some(text) = self.rates.sample(sample) {
            self.surface.show_rates(&text);
        }
    }

    pub fn update_coords(&mut self, coords: Vec<u64>) {
        self.surface.show_coords(&coords_text(&coords));
        if let Some(info) = self.self_info.as_mut() {
            info.coords = coords;
        }
    }

    pub fn set_self_info(&mut self, info: SelfInfo) {
        self.surface.show_self_info(&info);
        self.self_info = Some(info);
    }

    pub fn self_info_failed(&mut self, message: &str) {
        warn!(error = message, "self info unavailable");
        self.surface.show_self_error(message);
    }

    /// Forget everything (new session after a reconnect).
    pub fn reset(&mut self) {
        self.health.clear();
        self.peers = ConnectedPeersView::new();
        self.rates.reset();
        self.self_info = None;
        self.surface.clear();
    }

    pub fn health(&self) -> &PeerHealthTable {
        &self.health
    }

    pub fn peers(&self) -> &ConnectedPeersView {
        &self.peers
    }

    pub fn self_info(&self) -> Option<&SelfInfo> {
        self.self_info.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn render_peers(&mut self, update: &PeersUpdate) {
        debug!(status = %update.status, peers = update.lines.len(), "connected peers");
        self.surface.show_status(update.status);
        for index in self.health.mark_connected(&update.connected) {
            self.surface.update_health_row(index, &self.health.rows()[index]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityStatus;
    use crate::surface::MemorySurface;

    fn dashboard() -> Dashboard<MemorySurface> {
        Dashboard::new(MemorySurface::new())
    }

    fn peer(remote: &str) -> ConnectedPeer {
        ConnectedPeer::new(remote, false)
    }

    #[test]
    fn peers_then_health_equals_health_then_peers() {
        let mut a = dashboard();
        a.apply(MeshEvent::Peers(Some(vec![peer("tls://p1:1")])));
        a.apply(MeshEvent::Health(PeerProbeResult::with_ping("tls://p1:1", 12.0)));

        let mut b = dashboard();
        b.apply(MeshEvent::Health(PeerProbeResult::with_ping("tls://p1:1", 12.0)));
        b.apply(MeshEvent::Peers(Some(vec![peer("tls://p1:1")])));

        for d in [&a, &b] {
            let row = d.health().get("tls://p1:1").unwrap();
            assert!(row.connected);
            assert_eq!(row.latency_text(), "12");
            assert_eq!(d.surface().health_rows, d.health().rows());
        }
        assert_eq!(a.surface(), b.surface());
    }

    #[test]
    fn surface_mirrors_table_through_moves() {
        let mut d = dashboard();
        d.apply(MeshEvent::Health(PeerProbeResult::pending("a")));
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("b", 100.0)));
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("c", 9.0)));
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("a", 10.0)));
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("c", 200.0)));

        assert_eq!(d.surface().health_order(), ["a", "b", "c"]);
        assert_eq!(d.surface().health_rows, d.health().rows());
    }

    #[test]
    fn status_indicators_are_exclusive() {
        let mut d = dashboard();
        d.apply(MeshEvent::Peers(Some(vec![])));
        assert_eq!(d.surface().visible_indicators(), ["st-connecting"]);

        d.apply(MeshEvent::Peers(Some(vec![ConnectedPeer::new("tcp://[fe80::1%e]:1", true)])));
        assert_eq!(d.surface().visible_indicators(), ["st-multicast"]);

        d.apply(MeshEvent::Peers(Some(vec![peer("tls://x:1")])));
        assert_eq!(d.surface().visible_indicators(), ["st-connected"]);
    }

    #[test]
    fn failed_fetch_clears_view() {
        let mut d = dashboard();
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("tls://p1:1", 3.0)));
        d.replace_peers(vec![peer("tls://p1:1")]);
        assert!(d.health().get("tls://p1:1").unwrap().connected);

        d.peers_fetch_failed("connection refused");
        assert!(d.peers().peers().is_empty());
        assert_eq!(d.peers().status(), ConnectivityStatus::Error);
        assert!(!d.health().get("tls://p1:1").unwrap().connected);
        assert!(!d.surface().health_rows[0].connected);
        assert_eq!(d.surface().peers_error.as_deref(), Some("connection refused"));
        assert!(d.surface().peer_lines.is_empty());
    }

    #[test]
    fn rates_render_after_second_sample() {
        let mut d = dashboard();
        let sample = |rx, t| RateSample { bytes_recvd: rx, bytes_sent: 0, timestamp_ms: t };
        d.apply(MeshEvent::Rxtx(Some(sample(0, 0))));
        assert!(d.surface().rates.is_none());
        d.apply(MeshEvent::Rxtx(Some(sample(1024, 1000))));
        assert_eq!(d.surface().rates.as_ref().unwrap().down, "1.00 kB/s");
        d.apply(MeshEvent::Rxtx(None));
        assert_eq!(d.surface().rates.as_ref().unwrap().up, "? B/s");
    }

    #[test]
    fn coords_update_self_info() {
        let mut d = dashboard();
        d.set_self_info(SelfInfo {
            address: "200::1".into(),
            coords: vec![1],
            ..SelfInfo::default()
        });
        assert_eq!(d.surface().coords.as_deref(), Some("[1]"));
        d.apply(MeshEvent::Coord(vec![1, 5, 3]));
        assert_eq!(d.surface().coords.as_deref(), Some("[1 5 3]"));
        assert_eq!(d.self_info().unwrap().coords, vec![1, 5, 3]);
    }

    #[test]
    fn reset_drops_all_state() {
        let mut d = dashboard();
        d.apply(MeshEvent::Health(PeerProbeResult::with_ping("a", 1.0)));
        d.apply(MeshEvent::Peers(Some(vec![peer("a")])));
        d.reset();
        assert!(d.health().is_empty());
        assert!(d.peers().peers().is_empty());
        assert!(d.rates.previous().is_none());
        assert_eq!(d.surface(), &MemorySurface::default());
    }
}
