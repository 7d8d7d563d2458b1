//! The Bingohall game core.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster, cards, and call sequence, so every operation on a room sees
//! and leaves it whole. Different rooms share nothing and never wait on
//! each other.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, assigns ids, routes operations
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: one room's synchronous state machine
//! - [`CallSequencer`]: draws uncalled numbers, enforces the cooldown
//! - [`generate_card`] / [`has_winning_pattern`]: dealing and win checking
//! - [`RoomConfig`]: cooldown and creator-only policy
//! - [`StatsStore`] / [`Clock`]: collaborators the registry reports to
//!   and reads time from

mod caller;
mod card;
mod clock;
mod config;
mod error;
mod pattern;
mod registry;
mod room;
mod stats;

pub use caller::{Call, CallError, CallSequencer};
pub use card::generate_card;
pub use clock::{Clock, TokioClock};
pub use config::{DEFAULT_CALL_COOLDOWN, DEFAULT_WIN_POINTS, RoomConfig};
pub use error::RoomError;
pub use pattern::{LINE_COUNT, LINES, Line, has_winning_pattern, winning_line};
pub use registry::RoomRegistry;
pub use room::{BingoCheck, CallOutcome, JoinOutcome, Room, RoomHandle};
pub use stats::{MemoryStatsStore, StatsStore};
