//! Surface that logs every update and keeps the rendered state in memory.

use meshdash_telemetry::surface::{DisplaySurface, MemorySurface};
use meshdash_telemetry::{
    ConnectivityStatus, PeerBadge, PeerHealthRow, PeerLine, Placement, RateText, SelfInfo,
};
use tracing::info;

const MASKED_KEY: &str = "••••••••••••••••";

/// Logging surface for headless replays.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    inner: MemorySurface,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MemorySurface {
        &self.inner
    }

    /// Multi-line summary of the final view.
    pub fn summary(&self) -> String {
        let state = &self.inner;
        let mut out = String::new();
        let status = state.status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into());
        out.push_str(&format!("status: {status}\n"));
        if let Some(rates) = &state.rates {
            out.push_str(&format!("down: {}  up: {}\n", rates.down, rates.up));
        }
        if let Some(coords) = &state.coords {
            out.push_str(&format!("coords: {coords}\n"));
        }
        if let Some(error) = &state.peers_error {
            out.push_str(&format!("peers: {error}\n"));
        }
        for line in &state.peer_lines {
            out.push_str(&format!("  {} {}\n", badge_text(&line.badge), line.address));
        }
        out.push_str(&format!("health ({} rows):\n", state.health_rows.len()));
        for row in &state.health_rows {
            let latency = row.latency_text();
            let latency = if latency.is_empty() {
                "-".to_string()
            } else {
                format!("{latency} ms")
            };
            let mark = if row.connected { "*" } else { " " };
            out.push_str(&format!("  {mark} {:>8}  {}\n", latency, row.peer));
        }
        out
    }
}

fn badge_text(badge: &PeerBadge) -> String {
    match badge {
        PeerBadge::Flag(code) => format!("[{code}]"),
        PeerBadge::Mesh => "[mesh]".to_string(),
    }
}

impl DisplaySurface for ConsoleSurface {
    fn show_status(&mut self, status: ConnectivityStatus) {
        if self.inner.status != Some(status) {
            info!(%status, "connectivity");
        }
        self.inner.show_status(status);
    }

    fn show_connected_peers(&mut self, lines: &[PeerLine]) {
        for line in lines {
            info!(badge = %badge_text(&line.badge), address = %line.address, "connected peer");
        }
        self.inner.show_connected_peers(lines);
    }

    fn show_peers_error(&mut self, message: &str) {
        info!(error = message, "connected peers");
        self.inner.show_peers_error(message);
    }

    fn place_health_row(&mut self, row: &PeerHealthRow, placement: Placement) {
        info!(
            peer = %row.peer,
            latency = %row.latency_text(),
            country = row.country_short.as_deref().unwrap_or("-"),
            row = placement.index(),
            "health"
        );
        self.inner.place_health_row(row, placement);
    }

    fn update_health_row(&mut self, index: usize, row: &PeerHealthRow) {
        info!(peer = %row.peer, connected = row.connected, row = index, "health connected flag");
        self.inner.update_health_row(index, row);
    }

    fn show_rates(&mut self, rates: &RateText) {
        info!(down = %rates.down, up = %rates.up, "throughput");
        self.inner.show_rates(rates);
    }

    fn show_self_info(&mut self, info: &SelfInfo) {
        // Never log the private key itself
        let private_key = if info.private_key.is_empty() { "" } else { MASKED_KEY };
        info!(
            address = %info.address,
            subnet = %info.subnet,
            coords = %info.coords_text(),
            key = %info.key,
            private_key,
            version = %info.build_version,
            "self"
        );
        self.inner.show_self_info(info);
    }

    fn show_self_error(&mut self, message: &str) {
        info!(error = message, "self");
        self.inner.show_self_error(message);
    }

    fn show_coords(&mut self, coords_text: &str) {
        info!(coords = coords_text, "coords");
        self.inner.show_coords(coords_text);
    }

    fn open_peer_picker(&mut self) {
        info!("probing candidate peers");
        self.inner.open_peer_picker();
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}
