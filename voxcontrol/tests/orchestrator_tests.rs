//! End-to-end orchestrator behavior against in-memory collaborators.
//!
//! Durations are millisecond-scale so completion paths run in real time
//! without slowing the suite down; timing assertions keep generous
//! margins.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use voxcontrol::{
    AllowAll, Authorizer, BackendError, ControlError, EnqueueOutcome, MessageHandle,
    NowPlayingRenderer, Orchestrator, OrchestratorSettings, PlaybackEvent, RenderError,
    SkipOutcome, StreamBackend,
};
use voxmodel::{Progress, SessionId, Track};

struct MockBackend {
    plays: Mutex<Vec<(SessionId, String)>>,
    pause_calls: AtomicUsize,
    resume_calls: AtomicUsize,
    leave_calls: AtomicUsize,
    fail_play: AtomicBool,
    fail_pause: AtomicBool,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            plays: Mutex::new(Vec::new()),
            pause_calls: AtomicUsize::new(0),
            resume_calls: AtomicUsize::new(0),
            leave_calls: AtomicUsize::new(0),
            fail_play: AtomicBool::new(false),
            fail_pause: AtomicBool::new(false),
        }
    }

    fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    fn leave_count(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StreamBackend for MockBackend {
    async fn play(&self, session: SessionId, source_ref: &str) -> Result<(), BackendError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(BackendError::new("no voice chat"));
        }
        self.plays
            .lock()
            .unwrap()
            .push((session, source_ref.to_string()));
        Ok(())
    }

    async fn pause(&self, _session: SessionId) -> Result<(), BackendError> {
        if self.fail_pause.load(Ordering::SeqCst) {
            return Err(BackendError::new("transport gone"));
        }
        self.pause_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self, _session: SessionId) -> Result<(), BackendError> {
        self.resume_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn leave(&self, _session: SessionId) -> Result<(), BackendError> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockRenderer {
    next_handle: AtomicU64,
    renders: AtomicUsize,
    updates: AtomicUsize,
    clears: Mutex<Vec<MessageHandle>>,
    fail_render: AtomicBool,
}

impl MockRenderer {
    fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            renders: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            clears: Mutex::new(Vec::new()),
            fail_render: AtomicBool::new(false),
        }
    }

    fn clear_count(&self) -> usize {
        self.clears.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl NowPlayingRenderer for MockRenderer {
    async fn render(
        &self,
        _session: SessionId,
        _track: &Track,
        _progress: &Progress,
    ) -> Result<MessageHandle, RenderError> {
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(RenderError::new("flood wait"));
        }
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(MessageHandle(
            self.next_handle.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn update(
        &self,
        _handle: MessageHandle,
        _progress: &Progress,
    ) -> Result<(), RenderError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self, handle: MessageHandle) -> Result<(), RenderError> {
        self.clears.lock().unwrap().push(handle);
        Ok(())
    }
}

struct DenyAll;

#[async_trait::async_trait]
impl Authorizer for DenyAll {
    async fn authorize(&self, _session: SessionId, _actor: i64) -> bool {
        false
    }
}

fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        ticker_interval: Duration::from_millis(20),
        watcher_grace: Duration::from_millis(40),
        queue_preview_limit: 10,
    }
}

fn rig() -> (Orchestrator, Arc<MockBackend>, Arc<MockRenderer>) {
    let backend = Arc::new(MockBackend::new());
    let renderer = Arc::new(MockRenderer::new());
    let orchestrator = Orchestrator::with_parts(
        backend.clone(),
        renderer.clone(),
        Arc::new(AllowAll),
        fast_settings(),
    );
    (orchestrator, backend, renderer)
}

fn live(title: &str) -> Track {
    Track::stream(title, format!("http://radio.example/{title}"))
}

fn song(title: &str, millis: u64) -> Track {
    Track::local_file(title, format!("/tmp/{title}.webm"))
        .with_duration(Duration::from_millis(millis))
}

const ROOM: SessionId = SessionId(-100123);

#[tokio::test]
async fn play_then_stop_leaves_nothing_behind() {
    let (orchestrator, backend, renderer) = rig();

    orchestrator.play(ROOM, song("short", 80)).await.unwrap();
    assert!(orchestrator.has_session(ROOM).await);

    assert!(orchestrator.stop(ROOM).await);
    assert!(!orchestrator.has_session(ROOM).await);
    assert_eq!(backend.leave_count(), 1);
    assert_eq!(renderer.clear_count(), 1);

    // Well past the track's deadline: the cancelled watcher must not
    // have fired anything.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(backend.play_count(), 1);
    assert_eq!(backend.leave_count(), 1);
    assert!(!orchestrator.has_session(ROOM).await);

    // Stopping again is a no-op, not an error
    assert!(!orchestrator.stop(ROOM).await);
}

#[tokio::test]
async fn enqueue_appends_while_actively_playing() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, live("SirasaFM")).await.unwrap();
    let outcome = orchestrator.enqueue(ROOM, song("next", 5000)).await.unwrap();
    assert_eq!(outcome, EnqueueOutcome::Queued { position: 1 });
    assert_eq!(backend.play_count(), 1);

    let outcome = orchestrator.enqueue(ROOM, song("later", 5000)).await.unwrap();
    assert_eq!(outcome, EnqueueOutcome::Queued { position: 2 });

    assert_eq!(
        orchestrator.queue_preview(ROOM).await,
        vec!["next".to_string(), "later".to_string()]
    );
}

#[tokio::test]
async fn enqueue_on_idle_room_starts_playback() {
    let (orchestrator, backend, _renderer) = rig();

    let outcome = orchestrator.enqueue(ROOM, live("RedFM")).await.unwrap();
    assert_eq!(outcome, EnqueueOutcome::Started);
    assert_eq!(backend.play_count(), 1);
    assert_eq!(orchestrator.snapshot(ROOM).await.unwrap().title.as_deref(), Some("RedFM"));
}

#[tokio::test]
async fn enqueue_on_paused_session_starts_fresh_playback() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, song("paused-one", 5000)).await.unwrap();
    orchestrator.pause(ROOM).await.unwrap();

    // A paused session is not "actively playing": the new track replaces
    // the paused one instead of queueing behind it.
    let outcome = orchestrator.enqueue(ROOM, live("YFM")).await.unwrap();
    assert_eq!(outcome, EnqueueOutcome::Started);
    assert_eq!(backend.play_count(), 2);

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("YFM"));
    assert!(!snapshot.paused);
    assert_eq!(snapshot.queue_len, 0);
}

#[tokio::test]
async fn pause_and_resume_keep_elapsed_accounting() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, song("ballad", 10_000)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;

    orchestrator.pause(ROOM).await.unwrap();
    assert_eq!(backend.pause_calls.load(Ordering::SeqCst), 1);

    let frozen = orchestrator.snapshot(ROOM).await.unwrap();
    assert!(frozen.paused);
    assert!(frozen.elapsed >= Duration::from_millis(100));
    assert!(frozen.elapsed < Duration::from_millis(600));
    assert!(!frozen.has_ticker);

    // Elapsed must not move while paused
    tokio::time::sleep(Duration::from_millis(150)).await;
    let still_frozen = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(still_frozen.elapsed, frozen.elapsed);

    orchestrator.resume(ROOM).await.unwrap();
    assert_eq!(backend.resume_calls.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let running = orchestrator.snapshot(ROOM).await.unwrap();
    assert!(!running.paused);
    assert!(running.elapsed >= frozen.elapsed + Duration::from_millis(80));
    assert!(running.has_ticker);
}

#[tokio::test]
async fn pause_errors_are_typed() {
    let (orchestrator, _backend, _renderer) = rig();

    assert!(matches!(
        orchestrator.pause(ROOM).await,
        Err(ControlError::NoSession(_))
    ));

    orchestrator.play(ROOM, live("SunFM")).await.unwrap();
    orchestrator.pause(ROOM).await.unwrap();
    assert!(matches!(
        orchestrator.pause(ROOM).await,
        Err(ControlError::AlreadyPaused(_))
    ));

    orchestrator.resume(ROOM).await.unwrap();
    assert!(matches!(
        orchestrator.resume(ROOM).await,
        Err(ControlError::NotPaused(_))
    ));
}

#[tokio::test]
async fn skip_with_queue_advances_in_place() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, live("SirasaFM")).await.unwrap();
    orchestrator.enqueue(ROOM, song("follow-up", 5000)).await.unwrap();

    let outcome = orchestrator.skip(ROOM).await.unwrap();
    assert_eq!(
        outcome,
        SkipOutcome::Advanced {
            title: "follow-up".to_string()
        }
    );
    assert_eq!(backend.play_count(), 2);
    assert_eq!(backend.leave_count(), 0);

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("follow-up"));
    assert_eq!(snapshot.queue_len, 0);
}

#[tokio::test]
async fn skip_with_empty_queue_is_a_stop() {
    let (orchestrator, backend, renderer) = rig();
    let mut events = orchestrator.subscribe_events();

    orchestrator.play(ROOM, live("SirasaFM")).await.unwrap();
    let outcome = orchestrator.skip(ROOM).await.unwrap();
    assert_eq!(outcome, SkipOutcome::Stopped);

    assert!(!orchestrator.has_session(ROOM).await);
    assert_eq!(backend.leave_count(), 1);
    assert_eq!(renderer.clear_count(), 1);

    let mut kinds = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        kinds.push(envelope.event);
    }
    assert!(kinds
        .iter()
        .any(|e| matches!(e, PlaybackEvent::SkippedToIdle { .. })));
}

#[tokio::test]
async fn skip_without_session_is_an_error() {
    let (orchestrator, _backend, _renderer) = rig();
    assert!(matches!(
        orchestrator.skip(ROOM).await,
        Err(ControlError::NoSession(_))
    ));
}

#[tokio::test]
async fn finished_track_auto_advances_without_going_idle() {
    let (orchestrator, backend, _renderer) = rig();
    let mut events = orchestrator.subscribe_events();

    orchestrator.play(ROOM, song("first", 80)).await.unwrap();
    orchestrator.enqueue(ROOM, live("SecondFM")).await.unwrap();

    // duration 80ms + grace 40ms; leave a wide margin
    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("SecondFM"));
    assert_eq!(backend.play_count(), 2);
    // No teardown happened in between
    assert_eq!(backend.leave_count(), 0);

    let mut saw_auto_advance = false;
    while let Ok(envelope) = events.try_recv() {
        match envelope.event {
            PlaybackEvent::AutoAdvanced { ref title, .. } => {
                assert_eq!(title, "SecondFM");
                saw_auto_advance = true;
            }
            PlaybackEvent::AutoStopped { .. } | PlaybackEvent::Stopped { .. } => {
                panic!("session must not go idle during auto-advance");
            }
            _ => {}
        }
    }
    assert!(saw_auto_advance);
}

#[tokio::test]
async fn finished_track_with_empty_queue_auto_stops_once() {
    let (orchestrator, backend, renderer) = rig();
    let mut events = orchestrator.subscribe_events();

    orchestrator.play(ROOM, song("only", 80)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(!orchestrator.has_session(ROOM).await);
    assert_eq!(backend.leave_count(), 1);
    // Terminal caption exactly once
    assert_eq!(renderer.clear_count(), 1);

    let mut auto_stops = 0;
    while let Ok(envelope) = events.try_recv() {
        if matches!(envelope.event, PlaybackEvent::AutoStopped { .. }) {
            auto_stops += 1;
        }
    }
    assert_eq!(auto_stops, 1);
}

#[tokio::test]
async fn live_streams_never_auto_advance() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, live("Forever")).await.unwrap();
    orchestrator.enqueue(ROOM, song("waiting", 5000)).await.unwrap();

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert!(snapshot.live);
    assert!(!snapshot.has_watcher);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("Forever"));
    assert_eq!(snapshot.queue_len, 1);
    assert_eq!(backend.play_count(), 1);
}

#[tokio::test]
async fn pause_freezes_auto_advance_countdown() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, song("nap", 100)).await.unwrap();
    orchestrator.enqueue(ROOM, live("AfterFM")).await.unwrap();
    orchestrator.pause(ROOM).await.unwrap();

    // Far past the un-paused deadline (100ms + 40ms grace): a paused
    // track must not auto-advance.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert!(snapshot.paused);
    assert_eq!(snapshot.title.as_deref(), Some("nap"));
    assert!(!snapshot.has_watcher);
    assert_eq!(backend.play_count(), 1);

    // After resume the watcher is re-armed with the remaining time and
    // completion proceeds normally.
    orchestrator.resume(ROOM).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("AfterFM"));
    assert_eq!(backend.play_count(), 2);
}

#[tokio::test]
async fn backend_play_failure_tears_the_session_down() {
    let (orchestrator, backend, _renderer) = rig();
    backend.fail_play.store(true, Ordering::SeqCst);

    let err = orchestrator.play(ROOM, live("Nope")).await.unwrap_err();
    assert!(matches!(err, ControlError::Backend { op: "play", .. }));
    assert!(!orchestrator.has_session(ROOM).await);
    assert_eq!(backend.leave_count(), 1);
}

#[tokio::test]
async fn backend_pause_failure_tears_the_session_down() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, live("Fragile")).await.unwrap();
    backend.fail_pause.store(true, Ordering::SeqCst);

    let err = orchestrator.pause(ROOM).await.unwrap_err();
    assert!(matches!(err, ControlError::Backend { op: "pause", .. }));
    assert!(!orchestrator.has_session(ROOM).await);
}

#[tokio::test]
async fn render_failure_does_not_stop_playback() {
    let (orchestrator, backend, renderer) = rig();
    renderer.fail_render.store(true, Ordering::SeqCst);

    orchestrator.play(ROOM, song("quiet", 5000)).await.unwrap();
    assert_eq!(backend.play_count(), 1);

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("quiet"));
    // No status message means no ticker; the watcher still runs
    assert!(!snapshot.has_ticker);
    assert!(snapshot.has_watcher);
}

#[tokio::test]
async fn ticker_updates_the_now_playing_message() {
    let (orchestrator, _backend, renderer) = rig();

    orchestrator.play(ROOM, live("Steady")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // 20ms interval over 150ms: several updates must have landed
    assert!(renderer.updates.load(Ordering::SeqCst) >= 3);
    orchestrator.stop(ROOM).await;

    let after_stop = renderer.updates.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(renderer.updates.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn authorizer_gates_privileged_commands() {
    let backend = Arc::new(MockBackend::new());
    let renderer = Arc::new(MockRenderer::new());
    let orchestrator = Orchestrator::with_parts(
        backend.clone(),
        renderer.clone(),
        Arc::new(DenyAll),
        fast_settings(),
    );

    orchestrator.play(ROOM, live("SirasaFM")).await.unwrap();

    assert!(matches!(
        orchestrator.pause_as(ROOM, 42).await,
        Err(ControlError::Unauthorized { actor: 42, .. })
    ));
    assert!(matches!(
        orchestrator.skip_as(ROOM, 42).await,
        Err(ControlError::Unauthorized { .. })
    ));
    assert!(matches!(
        orchestrator.stop_as(ROOM, 42).await,
        Err(ControlError::Unauthorized { .. })
    ));
    // The session is untouched
    assert!(orchestrator.has_session(ROOM).await);
}

#[tokio::test]
async fn rooms_are_fully_independent() {
    let (orchestrator, backend, _renderer) = rig();
    let other = SessionId(-200456);

    orchestrator.play(ROOM, live("RoomOne")).await.unwrap();
    orchestrator.play(other, song("RoomTwo", 5000)).await.unwrap();
    orchestrator.pause(other).await.unwrap();

    let one = orchestrator.snapshot(ROOM).await.unwrap();
    let two = orchestrator.snapshot(other).await.unwrap();
    assert!(!one.paused);
    assert!(two.paused);

    assert!(orchestrator.stop(ROOM).await);
    assert!(!orchestrator.has_session(ROOM).await);
    assert!(orchestrator.has_session(other).await);
    assert_eq!(backend.play_count(), 2);

    let mut sessions = orchestrator.active_sessions().await;
    sessions.sort();
    assert_eq!(sessions, vec![other]);
}

#[tokio::test]
async fn play_replaces_the_active_track_and_keeps_the_queue() {
    let (orchestrator, backend, _renderer) = rig();

    orchestrator.play(ROOM, live("First")).await.unwrap();
    orchestrator.enqueue(ROOM, song("queued", 5000)).await.unwrap();
    orchestrator.play(ROOM, live("Second")).await.unwrap();

    let snapshot = orchestrator.snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("Second"));
    assert_eq!(snapshot.queue_len, 1);
    assert_eq!(backend.play_count(), 2);
    assert_eq!(backend.leave_count(), 0);
}
