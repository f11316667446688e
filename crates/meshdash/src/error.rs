//! Error types for the dashboard session.

use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the dashboard session.
#[derive(Debug, Error)]
pub enum Error {
    /// Telemetry engine error
    #[error(transparent)]
    Telemetry(#[from] meshdash_telemetry::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid config {key}: {reason}")]
    Config { key: &'static str, reason: String },
}
