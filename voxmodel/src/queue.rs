//! Pending-track queue.

use crate::track::Track;
use std::collections::VecDeque;

/// Strict FIFO queue of pending tracks.
///
/// Tracks are consumed from the front on skip and auto-advance; there is
/// no reordering and no random access. An empty queue at completion time
/// means the session shuts down.
#[derive(Clone, Debug, Default)]
pub struct TrackQueue {
    tracks: VecDeque<Track>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a track at the back. Returns its 1-based queue position.
    pub fn push_back(&mut self, track: Track) -> usize {
        self.tracks.push_back(track);
        self.tracks.len()
    }

    /// Removes and returns the next track to play, if any.
    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Titles of the next tracks in play order, capped at `limit`.
    pub fn upcoming_titles(&self, limit: usize) -> Vec<String> {
        self.tracks
            .iter()
            .take(limit)
            .map(|t| t.title.clone())
            .collect()
    }
}
