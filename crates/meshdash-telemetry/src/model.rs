//! Wire types shared by the REST snapshot calls and the event stream.
//!
//! Field names follow the node's REST API (`peer`, `ping`, `remote`,
//! `bytes_recvd`, ...). Empty country codes are normalized to `None`.

use serde::{Deserialize, Deserializer, Serialize};

/// Result of one latency probe against a candidate peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerProbeResult {
    /// Peer URI as listed in the candidate directory.
    pub peer: String,

    /// Round-trip time in milliseconds. `None` until the probe returns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<f64>,

    /// ISO country code of the resolved address.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub country_short: Option<String>,

    /// Probe failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PeerProbeResult {
    /// Probe result that has not returned yet.
    pub fn pending(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            ping: None,
            country_short: None,
            error: None,
        }
    }

    /// Probe result with a measured latency.
    pub fn with_ping(peer: impl Into<String>, ping: f64) -> Self {
        Self {
            ping: Some(ping),
            ..Self::pending(peer)
        }
    }
}

/// A peer the node currently holds a live session with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPeer {
    /// Remote URI, possibly carrying an IPv6 scope id (`%eth0`).
    pub remote: String,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub country_short: Option<String>,

    /// Discovered through link-local multicast rather than configured.
    #[serde(default)]
    pub multicast: bool,

    #[serde(default)]
    pub bytes_recvd: u64,

    #[serde(default)]
    pub bytes_sent: u64,
}

impl ConnectedPeer {
    pub fn new(remote: impl Into<String>, multicast: bool) -> Self {
        Self {
            remote: remote.into(),
            country_short: None,
            multicast,
            bytes_recvd: 0,
            bytes_sent: 0,
        }
    }
}

/// Cumulative byte counters as carried by the `rxtx` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteCounters {
    #[serde(default)]
    pub bytes_recvd: u64,
    #[serde(default)]
    pub bytes_sent: u64,
}

/// Aggregate counters stamped with the time they were observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSample {
    pub bytes_recvd: u64,
    pub bytes_sent: u64,
    pub timestamp_ms: u64,
}

impl RateSample {
    /// Sum per-peer counters into one sample.
    pub fn aggregate(counters: &[ByteCounters], timestamp_ms: u64) -> Self {
        let (bytes_recvd, bytes_sent) = counters.iter().fold((0u64, 0u64), |(rx, tx), c| {
            (rx.saturating_add(c.bytes_recvd), tx.saturating_add(c.bytes_sent))
        });
        Self {
            bytes_recvd,
            bytes_sent,
            timestamp_ms,
        }
    }
}

/// Identity snapshot of the local node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfInfo {
    #[serde(default)]
    pub build_name: String,
    #[serde(default)]
    pub build_version: String,
    /// Public key, hex.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub domain: String,
    pub address: String,
    #[serde(default)]
    pub subnet: String,
    #[serde(default)]
    pub coords: Vec<u64>,
}

impl SelfInfo {
    pub fn coords_text(&self) -> String {
        coords_text(&self.coords)
    }
}

/// Render tree coordinates as `[a b c]`.
pub fn coords_text(coords: &[u64]) -> String {
    let joined: Vec<String> = coords.iter().map(u64::to_string).collect();
    format!("[{}]", joined.join(" "))
}

/// Entry of the persisted peer list (`PUT api/peers` body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerUrl {
    pub url: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
