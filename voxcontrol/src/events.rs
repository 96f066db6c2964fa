//! Playback event stream.
//!
//! Every completed transition is published on a broadcast channel.
//! Emission is fire and forget: no subscriber, no problem, and a slow
//! subscriber only loses its own backlog.

use tokio::sync::broadcast;
use tracing::debug;
use voxmodel::SessionId;

/// A playback transition on one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A track started from a direct play or enqueue-on-idle.
    TrackStarted { session: SessionId, title: String },
    /// A track was appended behind the active one.
    TrackQueued {
        session: SessionId,
        title: String,
        position: usize,
    },
    /// Skip started the next queued track.
    Skipped { session: SessionId, title: String },
    /// Skip found an empty queue and shut the session down.
    SkippedToIdle { session: SessionId },
    /// The watcher advanced to the next queued track.
    AutoAdvanced { session: SessionId, title: String },
    /// The watcher found an empty queue and shut the session down.
    AutoStopped { session: SessionId },
    Paused { session: SessionId },
    Resumed { session: SessionId },
    /// Explicit stop tore the session down.
    Stopped { session: SessionId },
}

/// Event enriched for broadcast (timestamp at emission).
#[derive(Clone, Debug)]
pub struct PlaybackEventEnvelope {
    pub event: PlaybackEvent,
    pub timestamp: std::time::SystemTime,
}

pub(crate) struct EventBus {
    event_tx: broadcast::Sender<PlaybackEventEnvelope>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            event_tx: broadcast::channel(capacity).0,
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PlaybackEventEnvelope> {
        self.event_tx.subscribe()
    }

    pub(crate) fn emit(&self, event: PlaybackEvent) {
        debug!(?event, "playback event");
        let envelope = PlaybackEventEnvelope {
            event,
            timestamp: std::time::SystemTime::now(),
        };
        // Err only means nobody is listening right now
        let _ = self.event_tx.send(envelope);
    }
}
