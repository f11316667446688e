//! Error types for the telemetry engine.

use thiserror::Error;

/// Result type for telemetry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling telemetry.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stream frame named an event kind the dashboard does not handle
    #[error("Unknown event kind: {0}")]
    UnknownEvent(String),

    /// One-shot REST fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(String),
}
