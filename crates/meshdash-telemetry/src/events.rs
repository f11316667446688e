//! Stream events: the raw tagged frame and its parsed form.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ByteCounters, ConnectedPeer, PeerProbeResult, RateSample};

/// The four event kinds carried by the node's event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Health,
    Peers,
    Rxtx,
    Coord,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Health => "health",
            EventKind::Peers => "peers",
            EventKind::Rxtx => "rxtx",
            EventKind::Coord => "coord",
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "health" => Ok(EventKind::Health),
            "peers" => Ok(EventKind::Peers),
            "rxtx" => Ok(EventKind::Rxtx),
            "coord" => Ok(EventKind::Coord),
            other => Err(Error::UnknownEvent(other.to_string())),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame off the stream: tagged, payload still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub id: Option<String>,
    pub kind: EventKind,
    /// JSON payload.
    pub data: String,
    /// Arrival time (unix millis); used as the rate sample timestamp.
    pub received_at_ms: u64,
}

impl RawEvent {
    pub fn new(kind: EventKind, data: impl Into<String>, received_at_ms: u64) -> Self {
        Self {
            id: None,
            kind,
            data: data.into(),
            received_at_ms,
        }
    }
}

/// A parsed stream event, ready to be applied to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshEvent {
    /// A probe result for one candidate peer
    Health(PeerProbeResult),
    /// Full connected-peers snapshot; `None` when the node reported none
    Peers(Option<Vec<ConnectedPeer>>),
    /// Aggregate byte counters; `None` when the node reported no data
    Rxtx(Option<RateSample>),
    /// Updated tree coordinates of the local node
    Coord(Vec<u64>),
}

impl MeshEvent {
    /// Parse the payload of a raw frame.
    pub fn decode(raw: &RawEvent) -> Result<Self> {
        let event = match raw.kind {
            EventKind::Health => MeshEvent::Health(serde_json::from_str(&raw.data)?),
            EventKind::Peers => MeshEvent::Peers(serde_json::from_str(&raw.data)?),
            EventKind::Rxtx => {
                let counters: Option<Vec<ByteCounters>> = serde_json::from_str(&raw.data)?;
                MeshEvent::Rxtx(
                    counters.map(|c| RateSample::aggregate(&c, raw.received_at_ms)),
                )
            }
            EventKind::Coord => MeshEvent::Coord(serde_json::from_str(&raw.data)?),
        };
        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            MeshEvent::Health(_) => EventKind::Health,
            MeshEvent::Peers(_) => EventKind::Peers,
            MeshEvent::Rxtx(_) => EventKind::Rxtx,
            MeshEvent::Coord(_) => EventKind::Coord,
        }
    }
}
