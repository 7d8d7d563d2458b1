//! Error types for the room layer.

use std::time::Duration;

use bingohall_protocol::{Handle, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is detected before the room changes anything, so a
/// returned error always means the room is exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is in a state that doesn't allow this operation.
    /// For example, calling a number before the game started.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// Every seat is taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The game in this room is over.
    #[error("room {0} has already finished")]
    AlreadyFinished(RoomId),

    /// The handle has no seat in this room.
    #[error("player {0} not in room {1}")]
    PlayerNotFound(Handle, RoomId),

    /// The last call was too recent. Retry after `remaining`.
    #[error("next call available in {}s", ceil_secs(*remaining))]
    Cooldown { remaining: Duration },

    /// Every number has been called.
    #[error("no numbers left to call in room {0}")]
    Exhausted(RoomId),

    /// A required field was missing or malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The room only lets its creator do this.
    #[error("only the room creator may do this, not {0}")]
    Forbidden(Handle),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// A stable, machine-readable name for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::RoomFull(_) => "room_full",
            Self::AlreadyFinished(_) => "already_finished",
            Self::PlayerNotFound(..) => "player_not_found",
            Self::Cooldown { .. } => "cooldown",
            Self::Exhausted(_) => "exhausted",
            Self::Validation(_) => "validation",
            Self::Forbidden(_) => "forbidden",
            Self::Unavailable(_) => "unavailable",
        }
    }

    /// Seconds until a cooldown lifts, rounded up so an active cooldown
    /// never reports zero. `None` for every other error.
    pub fn remaining_secs(&self) -> Option<u64> {
        match self {
            Self::Cooldown { remaining } => Some(ceil_secs(*remaining)),
            _ => None,
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 { secs + 1 } else { secs }
}
