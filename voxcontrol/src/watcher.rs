//! Completion watcher task.
//!
//! One-shot: sleeps for the track's remaining time plus a grace period,
//! then asks the orchestrator to advance the session. The epoch captured
//! at spawn time lets the orchestrator recognize a watcher that lost a
//! race with skip, pause or stop and must not fire. Abort during the
//! sleep is the normal cancellation path.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;
use voxmodel::SessionId;

use crate::orchestrator::Orchestrator;

pub(crate) struct WatcherSpec {
    pub(crate) session: SessionId,
    /// Session epoch at spawn; the wakeup is discarded if it moved.
    pub(crate) epoch: u64,
    /// Remaining track time plus grace.
    pub(crate) delay: Duration,
}

pub(crate) fn spawn(orchestrator: Orchestrator, spec: WatcherSpec) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(spec.delay).await;
        trace!(session = %spec.session, epoch = spec.epoch, "track deadline reached");
        orchestrator.complete_track(spec.session, spec.epoch).await;
    })
}
