//! Dashboard configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for a dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashConfig {
    /// Directory holding `self.json`, `peers.json` and `directory.json`
    pub fixture_dir: PathBuf,

    /// Event stream transcript (text/event-stream)
    pub events: PathBuf,

    /// Delay between replayed frames
    pub replay_interval: Duration,

    /// Capacity of the event channel
    pub channel_capacity: usize,

    /// Run a probe round against the candidate directory on start
    pub probe_candidates: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        let fixture_dir = PathBuf::from("./meshdash-data");
        Self {
            events: fixture_dir.join("events.sse"),
            fixture_dir,
            replay_interval: Duration::from_millis(1000),
            channel_capacity: 64,
            probe_candidates: false,
        }
    }
}

impl DashConfig {
    /// Create config from environment variables with defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup (environment, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let fixture_dir = lookup("MESHDASH_FIXTURE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.fixture_dir);

        let events = lookup("MESHDASH_EVENTS")
            .map(PathBuf::from)
            .unwrap_or_else(|| fixture_dir.join("events.sse"));

        let replay_interval = parse_var(&lookup, "MESHDASH_REPLAY_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.replay_interval);

        let channel_capacity: usize =
            parse_var(&lookup, "MESHDASH_CHANNEL_CAPACITY")?.unwrap_or(defaults.channel_capacity);
        if channel_capacity == 0 {
            return Err(Error::Config {
                key: "MESHDASH_CHANNEL_CAPACITY",
                reason: "must be at least 1".into(),
            });
        }

        let probe_candidates =
            parse_var(&lookup, "MESHDASH_PROBE_CANDIDATES")?.unwrap_or(defaults.probe_candidates);

        Ok(Self {
            fixture_dir,
            events,
            replay_interval,
            channel_capacity,
            probe_candidates,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| Error::Config {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}
