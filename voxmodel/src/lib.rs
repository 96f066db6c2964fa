//! # VoxModel
//!
//! Pure data types shared across the VoxMusic workspace:
//!
//! - [`SessionId`]: identifies one chat room's playback session
//! - [`Track`] / [`TrackSource`]: an immutable playable track descriptor
//! - [`TrackQueue`]: strict FIFO of pending tracks
//! - [`Progress`] and time formatting helpers for now-playing displays
//!
//! This crate has no async code and no I/O; everything here is cheap to
//! clone and safe to capture into background tasks.

pub mod queue;
pub mod session_id;
pub mod time;
pub mod track;

pub use queue::TrackQueue;
pub use session_id::SessionId;
pub use time::{format_track_clock, Progress};
pub use track::{Track, TrackSource};
