//! Meshdash Telemetry
//!
//! Reconciliation engine behind the mesh node status dashboard. It folds an
//! initial REST snapshot and a continuous event stream into one consistent
//! view of peer health, connectivity and throughput.
//!
//! # Architecture
//!
//! - **Rate**: cumulative byte counters to a human-scaled transfer rate
//! - **Connectivity**: one status label for the connected-peers snapshot
//! - **Health table**: probe results ordered by latency, with minimal moves
//! - **Peers view**: the authoritative connected set, replaced wholesale
//! - **Dispatch**: a single loop applying tagged stream frames in order
//! - **Surface**: the output trait the dashboard renders into
//!
//! # Example
//!
//! ```
//! use meshdash_telemetry::{Dashboard, Dispatcher, EventKind, MemorySurface, RawEvent};
//!
//! let mut dashboard = Dashboard::new(MemorySurface::new());
//! let mut dispatcher = Dispatcher::new();
//! let event = RawEvent::new(EventKind::Health, r#"{"peer":"tls://1.2.3.4:443","ping":12}"#, 0);
//! dispatcher.dispatch(&mut dashboard, &event);
//! assert_eq!(dashboard.surface().health_order(), ["tls://1.2.3.4:443"]);
//! ```

pub mod collate;
pub mod connectivity;
pub mod dashboard;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod health_table;
pub mod model;
pub mod peers_view;
pub mod rate;
pub mod sse;
pub mod surface;

pub use connectivity::{classify, ConnectivityStatus};
pub use dashboard::Dashboard;
pub use directory::{CandidateDirectory, PeerSelection, SelectionEntry};
pub use dispatch::{DispatchStats, Dispatcher};
pub use error::{Error, Result};
pub use events::{EventKind, MeshEvent, RawEvent};
pub use health_table::{PeerHealthRow, PeerHealthTable, Placement};
pub use model::{ByteCounters, ConnectedPeer, PeerProbeResult, PeerUrl, RateSample, SelfInfo};
pub use peers_view::{ConnectedPeersView, PeerBadge, PeerLine};
pub use rate::{human_readable_speed, RateText, RateTracker};
pub use sse::{SseDecoder, SseFrame};
pub use surface::{DisplaySurface, MemorySurface};
