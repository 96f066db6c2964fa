//! VoxMusic demo: drives one room through a short scripted session
//! against logging stand-ins for the transport and the chat.

mod console;
mod logs;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use voxcontrol::{AllowAll, Orchestrator, OrchestratorSettingsExt};
use voxmodel::{SessionId, Track};
use voxsource::TrackResolver;
use voxstations::StationDirectory;

use console::{ConsoleBackend, ConsoleRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== Phase 1: infrastructure ==========
    logs::init_logging();
    let config = voxconfig::get_config();
    let settings = config.orchestrator_settings();
    info!(
        ticker_secs = settings.ticker_interval.as_secs(),
        grace_secs = settings.watcher_grace.as_secs(),
        "starting VoxMusic demo"
    );

    let orchestrator = Orchestrator::with_parts(
        Arc::new(ConsoleBackend),
        Arc::new(ConsoleRenderer::new()),
        Arc::new(AllowAll),
        settings,
    );

    // Narrate every playback transition
    let mut events = orchestrator.subscribe_events();
    tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            info!(event = ?envelope.event, "playback event");
        }
    });

    // ========== Phase 2: scripted session ==========
    let stations = StationDirectory::builtin();
    info!(stations = stations.len(), "station directory loaded");
    let room = SessionId(-1001);

    // Live radio first
    let station = stations.resolve("SirasaFM").await?;
    orchestrator.play(room, station).await?;
    tokio::time::sleep(Duration::from_secs(8)).await;

    // Queue a short finite track behind the stream, then skip to it
    let jingle = Track::local_file("Demo jingle", "/tmp/jingle.webm").with_duration_secs(6);
    orchestrator.enqueue(room, jingle).await?;
    info!(upcoming = ?orchestrator.queue_preview(room).await, "queue preview");
    orchestrator.skip(room).await?;

    // Exercise pause/resume in the middle of the countdown
    tokio::time::sleep(Duration::from_secs(2)).await;
    orchestrator.pause(room).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    orchestrator.resume(room).await?;

    // Let the jingle finish; the empty queue auto-stops the session
    tokio::time::sleep(Duration::from_secs(8)).await;
    if orchestrator.has_session(room).await {
        orchestrator.stop(room).await;
    }

    info!("demo finished");
    Ok(())
}
