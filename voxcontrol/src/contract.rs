//! Collaborator contracts.
//!
//! The orchestrator never touches the audio transport or the chat
//! platform directly; it goes through these traits. Implementations are
//! injected as trait objects, so tests run against in-memory fakes and
//! the demo app runs against logging stubs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use voxmodel::{Progress, SessionId, Track};

/// Opaque reference to a posted now-playing message.
///
/// The renderer mints one per `render` call; the orchestrator only ever
/// hands it back for updates and clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub u64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

/// Failure reported by the audio transport.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by the now-playing renderer.
///
/// Always treated as transient by the orchestrator: logged, never
/// propagated to callers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The audio transport one session streams through.
///
/// Any error from `play`, `pause` or `resume` means the transport is in
/// an unknown state; the orchestrator responds by tearing the whole
/// session down. `leave` failures during teardown are only logged.
#[async_trait]
pub trait StreamBackend: Send + Sync {
    async fn play(&self, session: SessionId, source_ref: &str) -> Result<(), BackendError>;
    async fn pause(&self, session: SessionId) -> Result<(), BackendError>;
    async fn resume(&self, session: SessionId) -> Result<(), BackendError>;
    async fn leave(&self, session: SessionId) -> Result<(), BackendError>;
}

/// Renders and maintains the per-session now-playing message.
#[async_trait]
pub trait NowPlayingRenderer: Send + Sync {
    /// Posts a fresh now-playing message for a track that just started.
    async fn render(
        &self,
        session: SessionId,
        track: &Track,
        progress: &Progress,
    ) -> Result<MessageHandle, RenderError>;

    /// Updates the progress clock on an existing message.
    async fn update(&self, handle: MessageHandle, progress: &Progress)
        -> Result<(), RenderError>;

    /// Rewrites the message to its terminal "stopped" form, controls
    /// removed. Called exactly once per message, best effort.
    async fn clear(&self, handle: MessageHandle) -> Result<(), RenderError>;
}

/// Decides whether an actor may run privileged commands on a session.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, session: SessionId, actor: i64) -> bool;
}

/// Default authorizer: everyone may do everything.
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn authorize(&self, _session: SessionId, _actor: i64) -> bool {
        true
    }
}

/// Backend that accepts everything and streams nothing.
pub struct NullBackend;

#[async_trait]
impl StreamBackend for NullBackend {
    async fn play(&self, _session: SessionId, _source_ref: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn pause(&self, _session: SessionId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn resume(&self, _session: SessionId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn leave(&self, _session: SessionId) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Renderer that mints handles and discards everything else.
#[derive(Default)]
pub struct NullRenderer {
    next_handle: AtomicU64,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NowPlayingRenderer for NullRenderer {
    async fn render(
        &self,
        _session: SessionId,
        _track: &Track,
        _progress: &Progress,
    ) -> Result<MessageHandle, RenderError> {
        Ok(MessageHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)))
    }

    async fn update(
        &self,
        _handle: MessageHandle,
        _progress: &Progress,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    async fn clear(&self, _handle: MessageHandle) -> Result<(), RenderError> {
        Ok(())
    }
}
