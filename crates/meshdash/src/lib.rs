//! Meshdash - live status dashboard for a mesh network node
//!
//! Wires the telemetry engine to its collaborators: the node's REST calls,
//! the event stream, and a rendering surface.
//!
//! # Architecture
//!
//! - **API**: the five REST calls behind a trait, served from fixtures
//! - **Session**: initial snapshot, dispatch loop, peer picker actions
//! - **Replay**: text/event-stream transcript into the event channel
//! - **Console**: logging surface for headless runs
//! - **Config**: environment-driven settings
//!
//! # Example
//!
//! ```no_run
//! use meshdash::{replay, ConsoleSurface, DashConfig, FixtureApi, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashConfig::from_env()?;
//!     let mut session = Session::new(FixtureApi::new(&config.fixture_dir), ConsoleSurface::new());
//!     session.start().await;
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(config.channel_capacity);
//!     let (events, interval) = (config.events.clone(), config.replay_interval);
//!     tokio::spawn(async move { replay::replay_file(&events, tx, interval).await });
//!     session.run(&mut rx).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod replay;
pub mod session;

pub use api::{FixtureApi, MeshApi};
pub use config::DashConfig;
pub use console::ConsoleSurface;
pub use error::{Error, Result};
pub use session::Session;
