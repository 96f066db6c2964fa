//! Time formatting and progress arithmetic for now-playing displays.

use std::time::Duration;

/// Formats a duration in seconds as MM:SS, switching to HH:MM:SS past
/// one hour.
///
/// # Examples
/// ```
/// # use voxmodel::time::format_track_clock;
/// assert_eq!(format_track_clock(0), "00:00");
/// assert_eq!(format_track_clock(61), "01:01");
/// assert_eq!(format_track_clock(3661), "01:01:01");
/// ```
pub fn format_track_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Playback progress at one point in time.
///
/// For finite tracks `remaining` counts down and saturates at zero; for
/// live streams it is `None` and only `elapsed` is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Duration,
    pub remaining: Option<Duration>,
}

impl Progress {
    /// Progress of a finite track of the given total duration.
    pub fn finite(elapsed: Duration, total: Duration) -> Self {
        Self {
            elapsed,
            remaining: Some(total.saturating_sub(elapsed)),
        }
    }

    /// Progress of a live stream (elapsed only).
    pub fn live(elapsed: Duration) -> Self {
        Self {
            elapsed,
            remaining: None,
        }
    }

    /// True once a finite track has run out. Never true for live streams.
    pub fn is_finished(&self) -> bool {
        matches!(self.remaining, Some(r) if r.is_zero())
    }

    /// The clock shown in the now-playing message: remaining countdown for
    /// finite tracks, elapsed time for live streams.
    pub fn clock_label(&self) -> String {
        match self.remaining {
            Some(remaining) => format_track_clock(remaining.as_secs()),
            None => format_track_clock(self.elapsed.as_secs()),
        }
    }
}
