//! # VoxControl
//!
//! Per-room live playback orchestration: one [`Orchestrator`] drives any
//! number of independent sessions, each with its own active track, FIFO
//! queue and pair of background tasks (a progress ticker updating the
//! now-playing message and a completion watcher firing auto-advance when
//! a finite track runs out).
//!
//! The orchestrator talks to the outside world only through the traits in
//! [`contract`]: a [`StreamBackend`] for the audio transport, a
//! [`NowPlayingRenderer`] for the status message, and an [`Authorizer`]
//! for privileged commands. Playback transitions are published on a
//! broadcast channel (see [`events`]).
//!
//! ## Concurrency model
//!
//! Sessions live in a registry keyed by [`SessionId`]; each entry carries
//! its own mutex, and the registry map lock is only held for lookups.
//! Operations on different rooms never block each other. Background tasks
//! that lose a race with a user command detect it through a per-session
//! epoch counter and exit without touching anything.
//!
//! ```no_run
//! use std::sync::Arc;
//! use voxcontrol::{NullBackend, NullRenderer, Orchestrator};
//! use voxmodel::{SessionId, Track};
//!
//! #[tokio::main]
//! async fn main() -> voxcontrol::Result<()> {
//!     let orchestrator = Orchestrator::new(Arc::new(NullBackend), Arc::new(NullRenderer::new()));
//!     let room = SessionId(-100123);
//!     orchestrator.play(room, Track::stream("SirasaFM", "http://live.trusl.com:1170/;")).await?;
//!     orchestrator.stop(room).await;
//!     Ok(())
//! }
//! ```

pub mod contract;
pub mod errors;
pub mod events;
pub mod orchestrator;
pub mod session;

mod registry;
mod ticker;
mod watcher;

#[cfg(feature = "config")]
pub mod config_ext;

pub use contract::{
    AllowAll, Authorizer, BackendError, MessageHandle, NowPlayingRenderer, NullBackend,
    NullRenderer, RenderError, StreamBackend,
};
pub use errors::{ControlError, Result};
pub use events::{PlaybackEvent, PlaybackEventEnvelope};
pub use orchestrator::{EnqueueOutcome, Orchestrator, OrchestratorSettings, SkipOutcome};
pub use session::SessionSnapshot;

#[cfg(feature = "config")]
pub use config_ext::OrchestratorSettingsExt;

pub use voxmodel::SessionId;
