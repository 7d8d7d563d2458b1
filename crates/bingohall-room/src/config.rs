//! Room policy configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum gap between two successful calls in one room.
pub const DEFAULT_CALL_COOLDOWN: Duration = Duration::from_secs(5);

/// Points awarded to a confirmed winner.
pub const DEFAULT_WIN_POINTS: u32 = 100;

/// Settings shared by every room a registry creates.
///
/// The defaults are the permissive policy: anyone may start a room or call
/// a number. Flip `creator_only_start` / `creator_only_call` to reserve
/// those operations for the player who created the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum time between two successful calls in the same room.
    pub call_cooldown: Duration,

    /// Only the creator may start the game.
    pub creator_only_start: bool,

    /// Only the creator may call numbers.
    pub creator_only_call: bool,

    /// Upper bound on the `max_players` a room may be created with.
    pub max_players_cap: usize,

    /// Score added to a player when their claim is confirmed.
    pub win_points: u32,

    /// Capacity of each room actor's command channel.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            call_cooldown: DEFAULT_CALL_COOLDOWN,
            creator_only_start: false,
            creator_only_call: false,
            max_players_cap: 100,
            win_points: DEFAULT_WIN_POINTS,
            command_buffer: 64,
        }
    }
}
