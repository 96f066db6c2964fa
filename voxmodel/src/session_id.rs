//! Session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one room's playback session.
///
/// Rooms are keyed by the numeric chat id assigned by the messaging
/// platform, so the inner value can be negative (group chats are).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionId(pub i64);

impl SessionId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SessionId {
    fn from(value: i64) -> Self {
        SessionId(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
