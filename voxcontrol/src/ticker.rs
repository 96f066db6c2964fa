//! Progress ticker task.
//!
//! One ticker per playing session with a status message. It captures
//! everything it needs at spawn time (message handle, segment start,
//! duration) and never takes the session lock, so a slow renderer cannot
//! stall user commands. Cancellation via `JoinHandle::abort` is the
//! normal way it dies on pause, skip and stop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;
use voxmodel::{Progress, SessionId};

use crate::contract::{MessageHandle, NowPlayingRenderer};

pub(crate) struct TickerSpec {
    pub(crate) session: SessionId,
    pub(crate) handle: MessageHandle,
    /// Instant the current playing segment would have started at if it
    /// had run uninterrupted (resume backdates it by the banked time).
    pub(crate) segment_start: Instant,
    /// Total track duration; `None` for live streams.
    pub(crate) duration: Option<Duration>,
    pub(crate) interval: Duration,
}

/// Spawns the periodic progress updater.
///
/// Finite tracks count down and the task ends on its own at zero; live
/// streams show elapsed time until cancelled. A failed update stops the
/// ticker silently; playback is not affected.
pub(crate) fn spawn(renderer: Arc<dyn NowPlayingRenderer>, spec: TickerSpec) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + spec.interval;
        let mut ticks = tokio::time::interval_at(start, spec.interval);
        loop {
            ticks.tick().await;
            let elapsed = spec.segment_start.elapsed();
            let progress = match spec.duration {
                Some(total) => Progress::finite(elapsed, total),
                None => Progress::live(elapsed),
            };
            let finished = progress.is_finished();
            if let Err(e) = renderer.update(spec.handle, &progress).await {
                debug!(session = %spec.session, error = %e, "progress update failed, ticker stopping");
                break;
            }
            if finished {
                debug!(session = %spec.session, "countdown reached zero, ticker done");
                break;
            }
        }
    })
}
