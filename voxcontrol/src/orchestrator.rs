//! The per-room playback state machine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, OwnedMutexGuard};
use tracing::{debug, info, trace, warn};
use voxmodel::{Progress, SessionId, Track};

use crate::contract::{AllowAll, Authorizer, NowPlayingRenderer, StreamBackend};
use crate::errors::{ControlError, Result};
use crate::events::{EventBus, PlaybackEvent, PlaybackEventEnvelope};
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionSnapshot};
use crate::ticker::{self, TickerSpec};
use crate::watcher::{self, WatcherSpec};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Tunables for the background tasks.
#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    /// Time between now-playing progress updates.
    pub ticker_interval: Duration,
    /// Extra time granted past a track's duration before auto-advance.
    pub watcher_grace: Duration,
    /// Maximum number of upcoming titles in a queue preview.
    pub queue_preview_limit: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            ticker_interval: Duration::from_secs(5),
            watcher_grace: Duration::from_secs(2),
            queue_preview_limit: 10,
        }
    }
}

/// What `enqueue` did with the track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended behind the active track at this 1-based position.
    Queued { position: usize },
    /// Nothing was actively playing; the track started right away.
    Started,
}

/// What `skip` did with the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The next queued track started.
    Advanced { title: String },
    /// The queue was empty; the session was shut down.
    Stopped,
}

/// How a track start was triggered; selects the event emitted for it.
enum StartKind {
    Direct,
    Skip,
    AutoAdvance,
}

/// Drives playback for any number of independent rooms.
///
/// Cheap to clone (shared inner state); background tasks hold their own
/// clone. All methods take `&self` and may be called concurrently from
/// any task.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    registry: SessionRegistry,
    backend: Arc<dyn StreamBackend>,
    renderer: Arc<dyn NowPlayingRenderer>,
    authorizer: Arc<dyn Authorizer>,
    events: EventBus,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Creates an orchestrator with default settings and an allow-all
    /// authorizer.
    pub fn new(backend: Arc<dyn StreamBackend>, renderer: Arc<dyn NowPlayingRenderer>) -> Self {
        Self::with_parts(
            backend,
            renderer,
            Arc::new(AllowAll),
            OrchestratorSettings::default(),
        )
    }

    pub fn with_parts(
        backend: Arc<dyn StreamBackend>,
        renderer: Arc<dyn NowPlayingRenderer>,
        authorizer: Arc<dyn Authorizer>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                registry: SessionRegistry::new(),
                backend,
                renderer,
                authorizer,
                events: EventBus::new(EVENT_CHANNEL_CAPACITY),
                settings,
            }),
        }
    }

    /// Subscribes to the playback event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEventEnvelope> {
        self.inner.events.subscribe()
    }

    /// Starts a track immediately, replacing whatever was playing.
    ///
    /// The queue is preserved; only the active track and its tasks are
    /// replaced. Creates the session if the room had none.
    pub async fn play(&self, session: SessionId, track: Track) -> Result<()> {
        let mut state = self.live_session(session).await;
        info!(session = %session, title = %track.title, "play requested");
        self.start_track(session, &mut state, track, StartKind::Direct)
            .await
    }

    /// Appends a track behind the active one, or starts it right away if
    /// nothing is actively playing.
    ///
    /// A paused session does NOT count as actively playing: enqueueing
    /// into it replaces the paused track with a fresh start.
    pub async fn enqueue(&self, session: SessionId, track: Track) -> Result<EnqueueOutcome> {
        let mut state = self.live_session(session).await;
        if state.is_actively_playing() {
            let title = track.title.clone();
            let position = state.queue.push_back(track);
            info!(session = %session, title = %title, position, "track queued");
            self.emit(PlaybackEvent::TrackQueued {
                session,
                title,
                position,
            });
            Ok(EnqueueOutcome::Queued { position })
        } else {
            self.start_track(session, &mut state, track, StartKind::Direct)
                .await?;
            Ok(EnqueueOutcome::Started)
        }
    }

    /// Skips to the next queued track, or shuts the session down when
    /// the queue is empty.
    pub async fn skip(&self, session: SessionId) -> Result<SkipOutcome> {
        let mut state = self
            .existing_session(session)
            .await
            .ok_or(ControlError::NoSession(session))?;
        state.cancel_watcher();
        match state.queue.pop_front() {
            Some(next) => {
                let title = next.title.clone();
                self.start_track(session, &mut state, next, StartKind::Skip)
                    .await?;
                Ok(SkipOutcome::Advanced { title })
            }
            None => {
                info!(session = %session, "skip with an empty queue, stopping");
                self.teardown(session, &mut state).await;
                self.emit(PlaybackEvent::SkippedToIdle { session });
                Ok(SkipOutcome::Stopped)
            }
        }
    }

    /// Pauses the active track, freezing its elapsed time and both
    /// background tasks' effects.
    ///
    /// The watcher is cancelled here and re-armed on resume with the
    /// remaining time, so a paused track can never auto-advance.
    pub async fn pause(&self, session: SessionId) -> Result<()> {
        let mut state = self
            .existing_session(session)
            .await
            .ok_or(ControlError::NoSession(session))?;
        if state.active_track.is_none() {
            return Err(ControlError::NoSession(session));
        }
        if state.paused {
            return Err(ControlError::AlreadyPaused(session));
        }

        if let Err(e) = self.inner.backend.pause(session).await {
            warn!(session = %session, error = %e, "backend pause failed, shutting the session down");
            self.teardown(session, &mut state).await;
            return Err(ControlError::Backend {
                op: "pause",
                session,
                message: e.to_string(),
            });
        }

        let elapsed = state.elapsed();
        state.accumulated = elapsed;
        state.started_at = None;
        state.paused = true;
        state.bump_epoch();
        state.teardown_tasks();

        info!(session = %session, elapsed_secs = elapsed.as_secs(), "playback paused");
        self.emit(PlaybackEvent::Paused { session });
        Ok(())
    }

    /// Resumes a paused track where it left off, restarting the ticker
    /// and re-arming the watcher with the remaining time.
    pub async fn resume(&self, session: SessionId) -> Result<()> {
        let mut state = self
            .existing_session(session)
            .await
            .ok_or(ControlError::NoSession(session))?;
        let Some(track) = state.active_track.clone() else {
            return Err(ControlError::NoSession(session));
        };
        if !state.paused {
            return Err(ControlError::NotPaused(session));
        }

        if let Err(e) = self.inner.backend.resume(session).await {
            warn!(session = %session, error = %e, "backend resume failed, shutting the session down");
            self.teardown(session, &mut state).await;
            return Err(ControlError::Backend {
                op: "resume",
                session,
                message: e.to_string(),
            });
        }

        let elapsed = state.accumulated;
        let now = Instant::now();
        // Backdate the segment start so elapsed() keeps counting from
        // where pause froze it.
        state.started_at = Some(now.checked_sub(elapsed).unwrap_or(now));
        state.accumulated = Duration::ZERO;
        state.paused = false;
        let epoch = state.bump_epoch();

        if let Some(handle) = state.now_playing {
            state.ticker = Some(ticker::spawn(
                self.inner.renderer.clone(),
                TickerSpec {
                    session,
                    handle,
                    segment_start: state.started_at.unwrap_or(now),
                    duration: track.duration,
                    interval: self.inner.settings.ticker_interval,
                },
            ));
        }
        if let Some(total) = track.duration {
            let remaining = total.saturating_sub(elapsed);
            state.watcher = Some(watcher::spawn(
                self.clone(),
                WatcherSpec {
                    session,
                    epoch,
                    delay: remaining + self.inner.settings.watcher_grace,
                },
            ));
        }

        info!(session = %session, elapsed_secs = elapsed.as_secs(), "playback resumed");
        self.emit(PlaybackEvent::Resumed { session });
        Ok(())
    }

    /// Shuts a session down: cancels both tasks, leaves the transport,
    /// clears the now-playing message, drops the queue, removes the
    /// registry entry.
    ///
    /// Never an error; returns whether a session existed.
    pub async fn stop(&self, session: SessionId) -> bool {
        let Some(mut state) = self.existing_session(session).await else {
            debug!(session = %session, "stop requested with no active session");
            return false;
        };
        info!(session = %session, "stop requested");
        self.teardown(session, &mut state).await;
        self.emit(PlaybackEvent::Stopped { session });
        true
    }

    /// [`pause`](Self::pause) gated by the authorizer.
    pub async fn pause_as(&self, session: SessionId, actor: i64) -> Result<()> {
        self.authorize(session, actor).await?;
        self.pause(session).await
    }

    /// [`resume`](Self::resume) gated by the authorizer.
    pub async fn resume_as(&self, session: SessionId, actor: i64) -> Result<()> {
        self.authorize(session, actor).await?;
        self.resume(session).await
    }

    /// [`skip`](Self::skip) gated by the authorizer.
    pub async fn skip_as(&self, session: SessionId, actor: i64) -> Result<SkipOutcome> {
        self.authorize(session, actor).await?;
        self.skip(session).await
    }

    /// [`stop`](Self::stop) gated by the authorizer.
    pub async fn stop_as(&self, session: SessionId, actor: i64) -> Result<bool> {
        self.authorize(session, actor).await?;
        Ok(self.stop(session).await)
    }

    /// Read-only view of one session, if it exists.
    pub async fn snapshot(&self, session: SessionId) -> Option<SessionSnapshot> {
        let state = self.existing_session(session).await?;
        Some(state.snapshot())
    }

    /// Upcoming titles for one session, capped by the configured limit.
    pub async fn queue_preview(&self, session: SessionId) -> Vec<String> {
        match self.existing_session(session).await {
            Some(state) => state
                .queue
                .upcoming_titles(self.inner.settings.queue_preview_limit),
            None => Vec::new(),
        }
    }

    pub async fn has_session(&self, session: SessionId) -> bool {
        self.inner.registry.contains(session).await
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.inner.registry.ids().await
    }

    async fn authorize(&self, session: SessionId, actor: i64) -> Result<()> {
        if self.inner.authorizer.authorize(session, actor).await {
            Ok(())
        } else {
            Err(ControlError::Unauthorized { session, actor })
        }
    }

    /// Locks the room's session, creating it if absent. Retries when the
    /// fetched entry was tombstoned by a concurrent stop before we got
    /// the lock.
    async fn live_session(&self, session: SessionId) -> OwnedMutexGuard<Session> {
        loop {
            let cell = self.inner.registry.get_or_create(session).await;
            let guard = cell.lock_owned().await;
            if !guard.defunct {
                return guard;
            }
            trace!(session = %session, "raced a teardown, refetching session");
        }
    }

    /// Locks the room's session without creating it. `None` when absent
    /// or tombstoned.
    async fn existing_session(&self, session: SessionId) -> Option<OwnedMutexGuard<Session>> {
        let cell = self.inner.registry.get(session).await?;
        let guard = cell.lock_owned().await;
        (!guard.defunct).then_some(guard)
    }

    /// Replaces the active track: invalidates in-flight background work,
    /// starts the transport, posts the now-playing message, spawns a
    /// fresh ticker/watcher pair.
    ///
    /// Holding the session lock across the whole transition is what makes
    /// "cancel old tasks, then start" atomic against user commands.
    async fn start_track(
        &self,
        session: SessionId,
        state: &mut Session,
        track: Track,
        kind: StartKind,
    ) -> Result<()> {
        let epoch = state.bump_epoch();
        state.teardown_tasks();

        if let Err(e) = self.inner.backend.play(session, track.source_ref()).await {
            warn!(session = %session, title = %track.title, error = %e, "backend play failed, shutting the session down");
            self.teardown(session, state).await;
            return Err(ControlError::Backend {
                op: "play",
                session,
                message: e.to_string(),
            });
        }

        let progress = match track.duration {
            Some(total) => Progress::finite(Duration::ZERO, total),
            None => Progress::live(Duration::ZERO),
        };
        let handle = match self.inner.renderer.render(session, &track, &progress).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                // Transient display failure; playback goes on without a
                // status message (and therefore without a ticker).
                warn!(session = %session, error = %e, "now-playing render failed");
                None
            }
        };

        let now = Instant::now();
        let duration = track.duration;
        let title = track.title.clone();
        state.active_track = Some(track);
        state.started_at = Some(now);
        state.accumulated = Duration::ZERO;
        state.paused = false;
        state.now_playing = handle;

        if let Some(handle) = handle {
            state.ticker = Some(ticker::spawn(
                self.inner.renderer.clone(),
                TickerSpec {
                    session,
                    handle,
                    segment_start: now,
                    duration,
                    interval: self.inner.settings.ticker_interval,
                },
            ));
        }
        if let Some(total) = duration {
            state.watcher = Some(watcher::spawn(
                self.clone(),
                WatcherSpec {
                    session,
                    epoch,
                    delay: total + self.inner.settings.watcher_grace,
                },
            ));
        }

        info!(session = %session, title = %title, live = duration.is_none(), "track started");
        self.emit(match kind {
            StartKind::Direct => PlaybackEvent::TrackStarted { session, title },
            StartKind::Skip => PlaybackEvent::Skipped { session, title },
            StartKind::AutoAdvance => PlaybackEvent::AutoAdvanced { session, title },
        });
        Ok(())
    }

    /// Full session shutdown under the caller's lock. Tombstones the
    /// state and removes the registry entry; errors from the transport
    /// and renderer are logged, never propagated.
    async fn teardown(&self, session: SessionId, state: &mut Session) {
        state.bump_epoch();
        state.teardown_tasks();

        if let Err(e) = self.inner.backend.leave(session).await {
            warn!(session = %session, error = %e, "backend leave failed");
        }
        if let Some(handle) = state.now_playing.take() {
            if let Err(e) = self.inner.renderer.clear(handle).await {
                debug!(session = %session, error = %e, "could not clear now-playing message");
            }
        }

        state.active_track = None;
        state.started_at = None;
        state.accumulated = Duration::ZERO;
        state.paused = false;
        state.queue.clear();
        state.defunct = true;
        self.inner.registry.remove(session).await;
        debug!(session = %session, "session torn down");
    }

    /// Watcher wakeup: the active track's deadline passed.
    ///
    /// Runs with the watcher's own epoch; any transition since its spawn
    /// makes the wakeup stale and it is dropped. On a genuine completion
    /// the session advances in place to the next queued track, or shuts
    /// down when the queue is empty.
    pub(crate) async fn complete_track(&self, session: SessionId, epoch: u64) {
        let Some(cell) = self.inner.registry.get(session).await else {
            return;
        };
        let mut state = cell.lock_owned().await;
        if state.defunct || state.epoch != epoch {
            trace!(session = %session, epoch, current = state.epoch, "stale watcher wakeup, ignoring");
            return;
        }
        // This task IS the stored watcher; drop the handle so the
        // transition below does not abort us mid-flight.
        state.watcher.take();

        match state.queue.pop_front() {
            Some(next) => {
                debug!(session = %session, title = %next.title, "track finished, advancing");
                if let Err(e) = self
                    .start_track(session, &mut state, next, StartKind::AutoAdvance)
                    .await
                {
                    warn!(session = %session, error = %e, "auto-advance failed");
                }
            }
            None => {
                info!(session = %session, "track finished with an empty queue, stopping");
                self.teardown(session, &mut state).await;
                self.emit(PlaybackEvent::AutoStopped { session });
            }
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        self.inner.events.emit(event);
    }
}
