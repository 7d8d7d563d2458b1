//! Wire types for Bingohall.
//!
//! This crate defines everything that crosses the boundary of the game
//! core: identities, cards, room snapshots, and the request/response
//! envelopes that a transport hands to the dispatcher.
//!
//! - **Types** ([`RoomId`], [`Handle`], [`Card`], [`RoomSnapshot`], etc.):
//!   the data the core reads and publishes.
//! - **Messages** ([`Request`], [`Response`]): one request per core
//!   operation, one response per outcome.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   validation, encoding, and decoding.
//!
//! The protocol layer knows nothing about locking, actors, or randomness.
//! It only describes data.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ErrorBody, Request, Response};
pub use types::{
    CARD_SIZE, Card, Cell, FREE_CELL, Handle, LatestCall, Letter, MAX_NUMBER, NUMBERS_PER_LETTER,
    PlayerSnapshot, PlayerStats, RoomId, RoomListEntry, RoomSnapshot, RoomStatus,
};
