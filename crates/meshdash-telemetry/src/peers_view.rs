//! Connected peers view.
//!
//! Holds the latest snapshot from `api/peers` or the `peers` event. Every
//! update is a wholesale replacement; the derived status, connected set and
//! display lines are recomputed from the stored snapshot alone.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::connectivity::{classify, ConnectivityStatus};
use crate::model::ConnectedPeer;

/// Badge shown in front of a connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum PeerBadge {
    /// Lowercase country code for a flag icon.
    Flag(String),
    /// Generic mesh glyph.
    Mesh,
}

/// One display line per connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerLine {
    pub badge: PeerBadge,
    pub address: String,
}

impl PeerLine {
    fn from_peer(peer: &ConnectedPeer) -> Self {
        let badge = match &peer.country_short {
            Some(code) if !peer.multicast => PeerBadge::Flag(code.to_lowercase()),
            _ => PeerBadge::Mesh,
        };
        Self {
            badge,
            address: strip_scope_id(&peer.remote),
        }
    }
}

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeersUpdate {
    pub status: ConnectivityStatus,
    pub connected: HashSet<String>,
    pub lines: Vec<PeerLine>,
}

/// Remove IPv6 zone suffixes (`%eth0`) from an address, up to the closing
/// bracket if there is one.
pub fn strip_scope_id(address: &str) -> String {
    static SCOPE: OnceLock<Regex> = OnceLock::new();
    let re = SCOPE.get_or_init(|| Regex::new(r"%[^\]]*").expect("static regex"));
    re.replace_all(address, "").into_owned()
}

/// The authoritative set of live sessions.
#[derive(Debug, Default)]
pub struct ConnectedPeersView {
    /// `None` after a failed fetch.
    snapshot: Option<Vec<ConnectedPeer>>,
}

impl ConnectedPeersView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot.
    pub fn replace(&mut self, snapshot: Vec<ConnectedPeer>) -> PeersUpdate {
        self.snapshot = Some(snapshot);
        self.derive()
    }

    /// Forget all peers after a failed fetch. Status becomes `Error`.
    pub fn clear(&mut self) -> PeersUpdate {
        self.snapshot = None;
        self.derive()
    }

    pub fn peers(&self) -> &[ConnectedPeer] {
        self.snapshot.as_deref().unwrap_or(&[])
    }

    pub fn status(&self) -> ConnectivityStatus {
        classify(self.snapshot.as_deref())
    }

    /// Remote addresses of the current snapshot, as the health table keys them.
    pub fn addresses(&self) -> HashSet<String> {
        self.peers().iter().map(|p| p.remote.clone()).collect()
    }

    fn derive(&self) -> PeersUpdate {
        PeersUpdate {
            status: self.status(),
            connected: self.addresses(),
            lines: self.peers().iter().map(PeerLine::from_peer).collect(),
        }
    }
}
