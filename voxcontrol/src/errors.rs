//! Error taxonomy for playback control.

use thiserror::Error;
use voxmodel::SessionId;

/// Errors surfaced by orchestrator operations.
///
/// Backend failures have already torn the session down by the time the
/// caller sees them. "Nothing to pause/resume" are soft failures a
/// command layer turns into a user message. Render failures never reach
/// this type; they are logged and swallowed. Task cancellation is normal
/// control flow, not an error.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The audio transport rejected an operation. The session has been
    /// fully torn down.
    #[error("backend {op} failed for session {session}: {message}")]
    Backend {
        op: &'static str,
        session: SessionId,
        message: String,
    },

    /// No active playback session for this room.
    #[error("no active session for {0}")]
    NoSession(SessionId),

    /// Resume was requested but the session is playing.
    #[error("session {0} is not paused")]
    NotPaused(SessionId),

    /// Pause was requested twice.
    #[error("session {0} is already paused")]
    AlreadyPaused(SessionId),

    /// The authorizer rejected a privileged command.
    #[error("actor {actor} may not control session {session}")]
    Unauthorized { session: SessionId, actor: i64 },
}

pub type Result<T> = std::result::Result<T, ControlError>;
