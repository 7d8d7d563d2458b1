//! Request dispatch: decode, route to the registry, encode the answer.
//!
//! The dispatcher is transport-agnostic. Whatever carries the bytes (an
//! HTTP route, a WebSocket frame, a test) calls [`Dispatcher::handle_bytes`]
//! or, with an already-decoded request, [`Dispatcher::handle`].

use std::sync::Arc;

use bingohall_protocol::{Codec, ErrorBody, ProtocolError, Request, Response};
use bingohall_room::{JoinOutcome, RoomError, RoomRegistry};

use crate::{BingoHallError, HallConfig};

/// Routes [`Request`]s to a [`RoomRegistry`].
///
/// Cheap to share: clone the `Arc` it's built from, or wrap the
/// dispatcher itself in one. Every method takes `&self`.
pub struct Dispatcher<C: Codec> {
    registry: Arc<RoomRegistry>,
    codec: C,
    leaderboard_limit: usize,
}

impl<C: Codec> Dispatcher<C> {
    /// Builds a fresh registry from `config`.
    pub fn from_config(config: &HallConfig, codec: C) -> Self {
        let registry = Arc::new(RoomRegistry::new(config.room.clone()));
        Self::new(registry, codec, config.leaderboard_limit)
    }

    /// Dispatches onto an existing registry.
    pub fn new(registry: Arc<RoomRegistry>, codec: C, leaderboard_limit: usize) -> Self {
        Self {
            registry,
            codec,
            leaderboard_limit,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Decodes one request, runs it, and encodes the response.
    ///
    /// Bytes that don't decode to a request are answered with a
    /// `validation` error response, not an `Err`.
    ///
    /// # Errors
    /// Only if the response itself fails to encode.
    pub async fn handle_bytes(&self, data: &[u8]) -> Result<Vec<u8>, BingoHallError> {
        let response = match self.codec.decode::<Request>(data) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode request");
                Response::Error(decode_error_body(&e))
            }
        };
        Ok(self.codec.encode(&response)?)
    }

    /// Runs one request against the registry.
    pub async fn handle(&self, request: Request) -> Response {
        match self.route(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(code = e.code(), error = %e, "request rejected");
                Response::Error(error_body(&e))
            }
        }
    }

    async fn route(&self, request: Request) -> Result<Response, RoomError> {
        let registry = &self.registry;
        match request {
            Request::CreateRoom {
                name,
                max_players,
                handle,
            } => {
                let room_id = registry.create_room(&name, max_players, handle).await?;
                Ok(Response::RoomCreated { room_id })
            }

            Request::JoinRoom { room_id, handle } => {
                let outcome = registry.join(&room_id, handle).await?;
                Ok(Response::Joined {
                    room_id,
                    already_member: outcome == JoinOutcome::AlreadyMember,
                })
            }

            Request::StartGame { room_id, handle } => {
                let status = registry.start(&room_id, handle).await?;
                Ok(Response::GameStarted { room_id, status })
            }

            Request::CallNumber { room_id, handle } => {
                let call = registry.call_number(&room_id, handle).await?;
                Ok(Response::NumberCalled {
                    letter: call.letter,
                    number: call.number,
                    called_numbers: call.called_numbers,
                })
            }

            Request::CheckBingo { room_id, handle } => {
                let check = registry.check_bingo(&room_id, handle).await?;
                Ok(Response::BingoChecked {
                    has_bingo: check.has_bingo,
                    winner: check.winner,
                    status: check.status,
                })
            }

            Request::GetRoom { room_id } => {
                let snapshot = registry.snapshot(&room_id).await?;
                Ok(Response::Room {
                    room: snapshot.as_ref().clone(),
                })
            }

            Request::ListRooms { status } => Ok(Response::RoomList {
                rooms: registry.list_by_status(status).await,
            }),

            Request::Leaderboard { limit } => {
                let limit = limit.unwrap_or(self.leaderboard_limit);
                Ok(Response::Leaderboard {
                    entries: registry.leaderboard(limit),
                })
            }
        }
    }
}

/// The wire form of a rejected operation.
pub fn error_body(err: &RoomError) -> ErrorBody {
    ErrorBody {
        code: err.code().to_string(),
        message: err.to_string(),
        remaining_secs: err.remaining_secs(),
    }
}

fn decode_error_body(err: &ProtocolError) -> ErrorBody {
    ErrorBody {
        code: "validation".to_string(),
        message: err.to_string(),
        remaining_secs: None,
    }
}
