//! Track descriptors.
//!
//! A [`Track`] is everything the playback core needs to know about one
//! playable entry: a display title, the reference the audio transport will
//! stream from, an optional thumbnail, and an optional duration. Tracks
//! without a duration are treated as infinite live streams and never
//! auto-advance.

use std::time::Duration;

/// Where a track's audio comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackSource {
    /// Remote stream URL (internet radio, extracted media URL).
    Stream(String),
    /// Path to a downloaded file on the local filesystem.
    LocalFile(String),
}

impl TrackSource {
    /// The reference string handed to the audio transport.
    pub fn source_ref(&self) -> &str {
        match self {
            TrackSource::Stream(url) => url,
            TrackSource::LocalFile(path) => path,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TrackSource::LocalFile(_))
    }
}

/// An immutable playable track.
///
/// Built once by a resolver (or directly for known streams) and never
/// mutated by the playback core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    /// Display title shown in now-playing messages.
    pub title: String,
    /// Playable source reference.
    pub source: TrackSource,
    /// Optional thumbnail path or URL for the now-playing message.
    pub thumbnail: Option<String>,
    /// Total duration. `None` means an infinite live stream.
    pub duration: Option<Duration>,
}

impl Track {
    /// Creates a live stream track (no duration, never auto-advances).
    pub fn stream(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: TrackSource::Stream(url.into()),
            thumbnail: None,
            duration: None,
        }
    }

    /// Creates a track backed by a local file.
    pub fn local_file(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: TrackSource::LocalFile(path.into()),
            thumbnail: None,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_duration_secs(self, seconds: u64) -> Self {
        self.with_duration(Duration::from_secs(seconds))
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// True for infinite streams (no known duration).
    pub fn is_live(&self) -> bool {
        self.duration.is_none()
    }

    pub fn is_local(&self) -> bool {
        self.source.is_local()
    }

    /// The reference string handed to the audio transport.
    pub fn source_ref(&self) -> &str {
        self.source.source_ref()
    }
}
