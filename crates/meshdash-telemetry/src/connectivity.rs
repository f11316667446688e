//! Aggregate connectivity status derived from the connected-peers snapshot.

use serde::{Deserialize, Serialize};

use crate::model::ConnectedPeer;

/// The single status indicator shown by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    /// The snapshot fetch failed
    Error,
    /// Reachable, but no sessions yet
    Connecting,
    /// Only link-local multicast peers
    Multicast,
    /// At least one configured (non-multicast) peer
    Connected,
}

impl ConnectivityStatus {
    pub const ALL: [ConnectivityStatus; 4] = [
        ConnectivityStatus::Error,
        ConnectivityStatus::Connecting,
        ConnectivityStatus::Multicast,
        ConnectivityStatus::Connected,
    ];

    /// Element id of the indicator on the page.
    pub fn indicator_id(&self) -> &'static str {
        match self {
            ConnectivityStatus::Error => "st-error",
            ConnectivityStatus::Connecting => "st-connecting",
            ConnectivityStatus::Multicast => "st-multicast",
            ConnectivityStatus::Connected => "st-connected",
        }
    }
}

impl std::fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectivityStatus::Error => "error",
            ConnectivityStatus::Connecting => "connecting",
            ConnectivityStatus::Multicast => "multicast",
            ConnectivityStatus::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Classify a snapshot. `None` means the snapshot could not be fetched.
pub fn classify(peers: Option<&[ConnectedPeer]>) -> ConnectivityStatus {
    match peers {
        None => ConnectivityStatus::Error,
        Some([]) => ConnectivityStatus::Connecting,
        Some(peers) if peers.iter().all(|p| p.multicast) => ConnectivityStatus::Multicast,
        Some(_) => ConnectivityStatus::Connected,
    }
}
