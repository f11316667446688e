//! meshdash binary
//!
//! Replays a captured node session: REST fixtures for the initial snapshot,
//! then an event-stream transcript through the dispatcher.

use meshdash::{replay, ConsoleSurface, DashConfig, FixtureApi, Session};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshdash=info,meshdash_telemetry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DashConfig::from_env()?;
    let api = FixtureApi::new(&config.fixture_dir);
    tracing::info!("Starting meshdash");
    tracing::info!("  Fixtures: {:?}", api.dir());
    tracing::info!("  Events: {:?}", config.events);

    let mut session = Session::new(api, ConsoleSurface::new());
    session.start().await;

    if config.probe_candidates {
        if let Err(e) = session.probe_candidates().await {
            tracing::warn!("Candidate probe skipped: {}", e);
        }
    }

    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let events = config.events.clone();
    let interval = config.replay_interval;
    let feeder = tokio::spawn(async move { replay::replay_file(&events, tx, interval).await });

    let stats = session.run(&mut rx).await;
    match feeder.await? {
        Ok(sent) => tracing::info!("Replayed {} frames", sent),
        Err(e) => tracing::error!("Event stream error: {}", e),
    }
    tracing::info!(
        "Applied {} events ({} health, {} peers, {} rxtx, {} coord), skipped {}",
        stats.applied,
        stats.health,
        stats.peers,
        stats.rxtx,
        stats.coord,
        stats.skipped
    );

    if config.probe_candidates {
        for entry in session.selection().entries() {
            tracing::info!(url = %entry.url, checked = entry.checked, "Peer picker entry");
        }
    }

    print!("{}", session.into_surface().summary());
    Ok(())
}
