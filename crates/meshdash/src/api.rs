//! Collaborator API: the node's REST calls as seen by the dashboard.
//!
//! | call | node endpoint |
//! |---|---|
//! | [`MeshApi::connected_peers`] | `GET api/peers` |
//! | [`MeshApi::self_info`] | `GET api/self` |
//! | [`MeshApi::candidate_directory`] | `GET` public peer registry |
//! | [`MeshApi::request_health`] | `POST api/health` |
//! | [`MeshApi::save_peers`] | `PUT api/peers` |
//!
//! [`FixtureApi`] answers from JSON files in a directory and records request
//! bodies next to them.

use std::future::Future;
use std::path::{Path, PathBuf};

use meshdash_telemetry::{CandidateDirectory, ConnectedPeer, PeerUrl, SelfInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub const SELF_FILE: &str = "self.json";
pub const PEERS_FILE: &str = "peers.json";
pub const DIRECTORY_FILE: &str = "directory.json";
pub const HEALTH_REQUEST_FILE: &str = "health-request.json";
pub const SAVED_PEERS_FILE: &str = "peers-saved.json";

/// The REST calls the dashboard consumes.
pub trait MeshApi {
    fn connected_peers(&self) -> impl Future<Output = Result<Vec<ConnectedPeer>>> + Send;

    fn self_info(&self) -> impl Future<Output = Result<SelfInfo>> + Send;

    fn candidate_directory(&self) -> impl Future<Output = Result<CandidateDirectory>> + Send;

    /// Ask the node to probe `peers`. Results arrive as `health` events.
    fn request_health(&self, peers: &[String]) -> impl Future<Output = Result<()>> + Send;

    /// Persist the chosen peers in the node config.
    fn save_peers(&self, peers: &[PeerUrl]) -> impl Future<Output = Result<()>> + Send;
}

/// File-backed API for replaying a captured session.
#[derive(Debug, Clone)]
pub struct FixtureApi {
    dir: PathBuf,
}

impl FixtureApi {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let bytes = tokio::fs::read(self.dir.join(name)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::write(self.dir.join(name), bytes).await?;
        Ok(())
    }
}

impl MeshApi for FixtureApi {
    async fn connected_peers(&self) -> Result<Vec<ConnectedPeer>> {
        self.read_json(PEERS_FILE).await
    }

    async fn self_info(&self) -> Result<SelfInfo> {
        self.read_json(SELF_FILE).await
    }

    async fn candidate_directory(&self) -> Result<CandidateDirectory> {
        self.read_json(DIRECTORY_FILE).await
    }

    async fn request_health(&self, peers: &[String]) -> Result<()> {
        tracing::debug!(count = peers.len(), "recording health request");
        self.write_json(HEALTH_REQUEST_FILE, peers).await
    }

    async fn save_peers(&self, peers: &[PeerUrl]) -> Result<()> {
        tracing::debug!(count = peers.len(), "recording saved peers");
        self.write_json(SAVED_PEERS_FILE, peers).await
    }
}
