//! Unified error type for Bingohall.

use bingohall_protocol::ProtocolError;
use bingohall_room::RoomError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `bingohall` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum BingoHallError {
    /// A protocol-level error (encode, decode, invalid value).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, cooldown, ...).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The environment held an unusable setting.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
