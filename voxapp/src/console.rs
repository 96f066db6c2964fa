//! Logging stand-ins for the audio transport and the chat renderer.
//!
//! The demo has no voice chat and no messaging platform behind it; these
//! implementations narrate every call through tracing so the scripted
//! session below is fully observable.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;
use voxcontrol::{
    BackendError, MessageHandle, NowPlayingRenderer, RenderError, StreamBackend,
};
use voxmodel::{Progress, SessionId, Track};

pub struct ConsoleBackend;

#[async_trait]
impl StreamBackend for ConsoleBackend {
    async fn play(&self, session: SessionId, source_ref: &str) -> Result<(), BackendError> {
        info!(session = %session, source = %source_ref, "[transport] streaming");
        Ok(())
    }

    async fn pause(&self, session: SessionId) -> Result<(), BackendError> {
        info!(session = %session, "[transport] paused");
        Ok(())
    }

    async fn resume(&self, session: SessionId) -> Result<(), BackendError> {
        info!(session = %session, "[transport] resumed");
        Ok(())
    }

    async fn leave(&self, session: SessionId) -> Result<(), BackendError> {
        info!(session = %session, "[transport] left");
        Ok(())
    }
}

#[derive(Default)]
pub struct ConsoleRenderer {
    next_handle: AtomicU64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NowPlayingRenderer for ConsoleRenderer {
    async fn render(
        &self,
        session: SessionId,
        track: &Track,
        progress: &Progress,
    ) -> Result<MessageHandle, RenderError> {
        let handle = MessageHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        info!(
            session = %session,
            handle = %handle,
            title = %track.title,
            live = track.is_live(),
            clock = %progress.clock_label(),
            "[chat] now playing"
        );
        Ok(handle)
    }

    async fn update(&self, handle: MessageHandle, progress: &Progress) -> Result<(), RenderError> {
        info!(handle = %handle, clock = %progress.clock_label(), "[chat] progress");
        Ok(())
    }

    async fn clear(&self, handle: MessageHandle) -> Result<(), RenderError> {
        info!(handle = %handle, "[chat] playback stopped");
        Ok(())
    }
}
