//! Per-room session state.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use voxmodel::{Progress, Track, TrackQueue};

use crate::contract::MessageHandle;

/// Mutable playback state of one room.
///
/// Lives behind its own mutex in the registry; every field change happens
/// under that lock. Elapsed time is split into `accumulated` (play time
/// banked before the current segment, frozen by pause) and the running
/// segment measured from `started_at`.
pub(crate) struct Session {
    pub(crate) active_track: Option<Track>,
    /// Start of the current playing segment. `None` while paused.
    pub(crate) started_at: Option<Instant>,
    /// Play time banked before `started_at`.
    pub(crate) accumulated: Duration,
    pub(crate) paused: bool,
    pub(crate) now_playing: Option<MessageHandle>,
    pub(crate) ticker: Option<JoinHandle<()>>,
    pub(crate) watcher: Option<JoinHandle<()>>,
    pub(crate) queue: TrackQueue,
    /// Transition counter. Bumped on every state change that invalidates
    /// in-flight background work; a watcher whose epoch no longer matches
    /// lost a race and exits without touching the session.
    pub(crate) epoch: u64,
    /// Set when the session is removed from the registry. An operation
    /// that fetched the entry before removal sees this and retries.
    pub(crate) defunct: bool,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            active_track: None,
            started_at: None,
            accumulated: Duration::ZERO,
            paused: false,
            now_playing: None,
            ticker: None,
            watcher: None,
            queue: TrackQueue::new(),
            epoch: 0,
            defunct: false,
        }
    }

    /// Total play time of the active track.
    pub(crate) fn elapsed(&self) -> Duration {
        self.accumulated
            + self
                .started_at
                .map(|start| start.elapsed())
                .unwrap_or(Duration::ZERO)
    }

    /// True when a track is loaded and not paused.
    pub(crate) fn is_actively_playing(&self) -> bool {
        self.active_track.is_some() && !self.paused
    }

    pub(crate) fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub(crate) fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    pub(crate) fn cancel_watcher(&mut self) {
        if let Some(handle) = self.watcher.take() {
            handle.abort();
        }
    }

    /// Cancels both background tasks. Idempotent.
    pub(crate) fn teardown_tasks(&mut self) {
        self.cancel_ticker();
        self.cancel_watcher();
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            title: self.active_track.as_ref().map(|t| t.title.clone()),
            live: self
                .active_track
                .as_ref()
                .map(|t| t.is_live())
                .unwrap_or(false),
            paused: self.paused,
            elapsed: self.elapsed(),
            progress: self.active_track.as_ref().map(|t| match t.duration {
                Some(total) => Progress::finite(self.elapsed(), total),
                None => Progress::live(self.elapsed()),
            }),
            queue_len: self.queue.len(),
            has_ticker: self
                .ticker
                .as_ref()
                .map(|h| !h.is_finished())
                .unwrap_or(false),
            has_watcher: self
                .watcher
                .as_ref()
                .map(|h| !h.is_finished())
                .unwrap_or(false),
        }
    }
}

/// Read-only view of one session, for operators and tests.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    /// Title of the active track, if any.
    pub title: Option<String>,
    /// True when the active track is an infinite live stream.
    pub live: bool,
    pub paused: bool,
    /// Total play time of the active track so far.
    pub elapsed: Duration,
    /// Progress of the active track, if any.
    pub progress: Option<Progress>,
    pub queue_len: usize,
    /// A progress ticker task is live.
    pub has_ticker: bool,
    /// A completion watcher task is live.
    pub has_watcher: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmodel::Track;

    #[test]
    fn test_elapsed_frozen_while_paused() {
        let mut session = Session::new();
        session.active_track = Some(Track::stream("r", "u"));
        session.accumulated = Duration::from_secs(90);
        session.started_at = None;
        session.paused = true;

        assert_eq!(session.elapsed(), Duration::from_secs(90));
        assert!(!session.is_actively_playing());
    }

    #[test]
    fn test_elapsed_accumulates_running_segment() {
        let mut session = Session::new();
        session.active_track = Some(Track::stream("r", "u"));
        session.accumulated = Duration::from_secs(10);
        session.started_at = Some(Instant::now() - Duration::from_secs(5));

        let elapsed = session.elapsed();
        assert!(elapsed >= Duration::from_secs(15));
        assert!(elapsed < Duration::from_secs(16));
        assert!(session.is_actively_playing());
    }

    #[test]
    fn test_epoch_bumps_monotonically() {
        let mut session = Session::new();
        assert_eq!(session.bump_epoch(), 1);
        assert_eq!(session.bump_epoch(), 2);
        assert_eq!(session.epoch, 2);
    }

    #[test]
    fn test_idle_snapshot() {
        let snapshot = Session::new().snapshot();
        assert!(snapshot.title.is_none());
        assert!(snapshot.progress.is_none());
        assert!(!snapshot.has_ticker);
        assert!(!snapshot.has_watcher);
        assert_eq!(snapshot.queue_len, 0);
    }
}
