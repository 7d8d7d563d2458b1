//! # Bingohall
//!
//! Multiplayer bingo rooms. Players create and join rooms, each receiving
//! a randomly generated 5x5 card. Numbers are drawn one at a time with a
//! per-room cooldown, and the first confirmed claim of a completed row,
//! column, or diagonal finishes the game.
//!
//! This crate ties the layers together: it loads [`HallConfig`], builds a
//! [`RoomRegistry`], and exposes a [`Dispatcher`] that answers wire
//! [`Request`]s with [`Response`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bingohall::prelude::*;
//!
//! # async fn run() -> Result<(), BingoHallError> {
//! bingohall::logging::init();
//! let config = HallConfig::from_env()?;
//! let hall = Dispatcher::from_config(&config, JsonCodec);
//!
//! let reply = hall
//!     .handle_bytes(br#"{"type":"list_rooms","status":"Waiting"}"#)
//!     .await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
mod handler;
pub mod logging;

pub use config::{ConfigError, HallConfig};
pub use error::BingoHallError;
pub use handler::{Dispatcher, error_body};

pub use bingohall_protocol as protocol;
pub use bingohall_room as room;

pub mod prelude {
    pub use bingohall_protocol::{
        Card, Cell, Codec, ErrorBody, Handle, JsonCodec, Letter, PlayerStats,
        Request, Response, RoomId, RoomListEntry, RoomSnapshot, RoomStatus,
    };
    pub use bingohall_room::{
        BingoCheck, CallOutcome, JoinOutcome, RoomConfig, RoomError,
        RoomRegistry,
    };

    pub use crate::{BingoHallError, ConfigError, Dispatcher, HallConfig};
}

pub use bingohall_protocol::{Request, Response};
pub use bingohall_room::RoomRegistry;
