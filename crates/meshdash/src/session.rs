//! Dashboard session: one-shot fetches, the dispatch loop, and the peer
//! picker actions.
//!
//! A session owns the collaborator API and the [`Dashboard`]. Everything runs
//! on one task; a fetch suspends only its own call site.

use meshdash_telemetry::{
    DispatchStats, Dispatcher, Dashboard, DisplaySurface, PeerSelection, RawEvent,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::MeshApi;
use crate::error::Result;

#[derive(Debug)]
pub struct Session<A, S> {
    api: A,
    dashboard: Dashboard<S>,
    dispatcher: Dispatcher,
}

impl<A: MeshApi, S: DisplaySurface> Session<A, S> {
    pub fn new(api: A, surface: S) -> Self {
        Self {
            api,
            dashboard: Dashboard::new(surface),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Initial REST snapshot: connected peers, then self info.
    pub async fn start(&mut self) {
        info!("dashboard session starting");
        self.refresh_peers().await;
        self.refresh_self_info().await;
    }

    /// Fetch the connected-peers snapshot. A failure clears the view.
    pub async fn refresh_peers(&mut self) {
        match self.api.connected_peers().await {
            Ok(peers) => self.dashboard.replace_peers(peers),
            Err(e) => self.dashboard.peers_fetch_failed(&e.to_string()),
        }
    }

    pub async fn refresh_self_info(&mut self) {
        match self.api.self_info().await {
            Ok(info) => self.dashboard.set_self_info(info),
            Err(e) => self.dashboard.self_info_failed(&e.to_string()),
        }
    }

    /// Apply one stream frame.
    pub fn dispatch(&mut self, raw: &RawEvent) -> bool {
        self.dispatcher.dispatch(&mut self.dashboard, raw)
    }

    /// Consume the event channel until it closes.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<RawEvent>) -> DispatchStats {
        self.dispatcher.run(&mut self.dashboard, events).await
    }

    /// Fetch the candidate directory and ask the node to probe every peer in it.
    ///
    /// Returns the number of peers submitted. Results arrive later as
    /// `health` events.
    pub async fn probe_candidates(&mut self) -> Result<usize> {
        let directory = self.api.candidate_directory().await.inspect_err(|e| {
            error!(error = %e, "candidate directory unavailable");
        })?;
        self.dashboard.surface_mut().open_peer_picker();
        let peers = directory.peer_ids();
        self.api.request_health(&peers).await.inspect_err(|e| {
            error!(error = %e, "health probe request failed");
        })?;
        info!(count = peers.len(), "health probe requested");
        Ok(peers.len())
    }

    /// Checkbox state for the picker, seeded from the health table.
    pub fn selection(&self) -> PeerSelection {
        PeerSelection::from_rows(self.dashboard.health().rows())
    }

    /// Persist the checked peers.
    pub async fn save_selection(&self, selection: &PeerSelection) -> Result<()> {
        let body = selection.save_body();
        self.api.save_peers(&body).await.inspect_err(|e| {
            error!(error = %e, "saving peers failed");
        })?;
        info!(count = body.len(), "peers saved");
        Ok(())
    }

    /// Drop all state before reconnecting.
    pub fn reset(&mut self) {
        info!("dashboard session reset");
        self.dashboard.reset();
        self.dispatcher = Dispatcher::new();
    }

    pub fn dashboard(&self) -> &Dashboard<S> {
        &self.dashboard
    }

    pub fn into_surface(self) -> S {
        self.dashboard.into_surface()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FixtureApi;
    use crate::api::{DIRECTORY_FILE, HEALTH_REQUEST_FILE, PEERS_FILE, SAVED_PEERS_FILE, SELF_FILE};
    use meshdash_telemetry::{ConnectivityStatus, EventKind, MemorySurface};
    use std::path::PathBuf;

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn scratch_copy() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in [SELF_FILE, PEERS_FILE, DIRECTORY_FILE] {
            std::fs::copy(fixtures().join(name), dir.path().join(name)).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn start_renders_snapshot() {
        let mut session = Session::new(FixtureApi::new(fixtures()), MemorySurface::new());
        session.start().await;

        let surface = session.dashboard().surface();
        assert_eq!(surface.status, Some(ConnectivityStatus::Connected));
        assert_eq!(surface.peer_lines.len(), 2);
        assert_eq!(surface.peer_lines[1].address, "tcp://[fe80::c0a8:101]:41235");
        assert_eq!(
            surface.self_info.as_ref().unwrap().address,
            "21e:e795:8e82:a9e2:ff48:952d:55f2:f0bb"
        );
        assert_eq!(surface.coords.as_deref(), Some("[1 4 2]"));
    }

    #[tokio::test]
    async fn failed_fetch_shows_error_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(FixtureApi::new(dir.path()), MemorySurface::new());
        session.start().await;

        let surface = session.dashboard().surface();
        assert_eq!(surface.visible_indicators(), ["st-error"]);
        assert!(surface.peers_error.is_some());
        assert!(surface.self_error.is_some());
        assert!(session.dashboard().peers().peers().is_empty());
    }

    #[tokio::test]
    async fn transcript_replay_converges() {
        let mut session = Session::new(FixtureApi::new(fixtures()), MemorySurface::new());
        session.start().await;

        let (tx, mut rx) = mpsc::channel(16);
        let file = fixtures().join("events.sse");
        let feeder = tokio::spawn(async move {
            crate::replay::replay_file(&file, tx, std::time::Duration::ZERO).await
        });
        let stats = session.run(&mut rx).await;
        let sent = feeder.await.unwrap().unwrap();

        assert_eq!(sent, 11);
        assert_eq!(stats.applied + stats.skipped, sent as u64);
        assert_eq!(stats.skipped, 1);

        let health = session.dashboard().health();
        let order: Vec<&str> = health.rows().iter().map(|r| r.peer.as_str()).collect();
        assert_eq!(
            order,
            [
                "tls://51.15.204.214:54321",
                "tcp://62.210.85.80:39565",
                "tls://94.23.38.25:443",
                "tcp://unreachable.example:1"
            ]
        );
        assert!(health.get("tls://51.15.204.214:54321").unwrap().connected);
        assert!(!health.get("tcp://62.210.85.80:39565").unwrap().connected);
        assert_eq!(session.dashboard().surface().health_rows, health.rows());
        assert_eq!(session.dashboard().surface().coords.as_deref(), Some("[1 4 2 7]"));
    }

    #[tokio::test]
    async fn probe_and_save_round_trip() {
        let dir = scratch_copy();
        let mut session = Session::new(FixtureApi::new(dir.path()), MemorySurface::new());
        session.start().await;

        let count = session.probe_candidates().await.unwrap();
        assert_eq!(count, 4);
        assert!(session.dashboard().surface().picker_open);
        let written = std::fs::read(dir.path().join(HEALTH_REQUEST_FILE)).unwrap();
        let request: Vec<String> = serde_json::from_slice(&written).unwrap();
        assert_eq!(request.len(), 4);

        session.dispatch(&RawEvent::new(
            EventKind::Health,
            r#"{"peer":"tls://51.15.204.214:54321","ping":18}"#,
            0,
        ));
        session.dispatch(&RawEvent::new(
            EventKind::Health,
            r#"{"peer":"tls://94.23.38.25:443","ping":41}"#,
            0,
        ));

        let mut selection = session.selection();
        assert!(selection.set_checked("tls://94.23.38.25:443", true));
        session.save_selection(&selection).await.unwrap();

        let saved = std::fs::read_to_string(dir.path().join(SAVED_PEERS_FILE)).unwrap();
        assert_eq!(
            saved,
            r#"[{"url":"tls://51.15.204.214:54321"},{"url":"tls://94.23.38.25:443"}]"#
        );
    }

    #[tokio::test]
    async fn probe_without_directory_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(FixtureApi::new(dir.path()), MemorySurface::new());
        assert!(session.probe_candidates().await.is_err());
        assert!(!session.dashboard().surface().picker_open);
    }

    #[tokio::test]
    async fn reset_starts_over() {
        let mut session = Session::new(FixtureApi::new(fixtures()), MemorySurface::new());
        session.start().await;
        session.dispatch(&RawEvent::new(EventKind::Coord, "[9]", 0));
        session.reset();

        let (tx, mut rx) = mpsc::channel(1);
        drop(tx);
        assert_eq!(session.run(&mut rx).await, DispatchStats::default());
        assert_eq!(session.dashboard().surface(), &MemorySurface::default());
        assert!(session.dashboard().self_info().is_none());
    }
}
