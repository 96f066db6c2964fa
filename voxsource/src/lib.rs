//! # VoxSource
//!
//! Contracts between the playback core and the things that turn a user
//! query into a playable [`Track`]: search engines, media extractors,
//! station directories. The core never resolves anything itself; commands
//! resolve first and hand the finished track to the orchestrator.
//!
//! Implementors live in their own crates (`voxstations` for the built-in
//! radio directory) and are consumed as `Arc<dyn TrackResolver>`.

use std::time::Duration;

use voxmodel::Track;

pub use async_trait::async_trait;

/// Duration assumed for on-demand tracks whose metadata carries none.
///
/// Applied by resolvers, never by the playback core: a live station keeps
/// `duration = None` and plays until stopped.
pub const FALLBACK_DURATION: Duration = Duration::from_secs(240);

/// Errors produced while resolving a query into a track.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Nothing playable matched the query.
    #[error("no playable result for '{0}'")]
    NotFound(String),

    /// The upstream source is unreachable or rejected the request.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The source answered but its payload could not be turned into a track.
    #[error("extraction failed: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Turns a free-form user query into a playable track.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Track>;
}

/// Produces a thumbnail for a resolved track, if one can be had.
///
/// Failures are not interesting to callers; a resolver that cannot
/// produce artwork simply returns `None`.
#[async_trait]
pub trait ThumbnailProvider: Send + Sync {
    async fn render_thumbnail(&self, track: &Track) -> Option<String>;
}

/// Applies [`FALLBACK_DURATION`] to an on-demand track missing one.
///
/// Live streams pass through untouched.
pub fn with_fallback_duration(track: Track) -> Track {
    if track.is_local() && track.duration.is_none() {
        track.with_duration(FALLBACK_DURATION)
    } else {
        track
    }
}
