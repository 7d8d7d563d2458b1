//! Request and response envelopes.
//!
//! A transport (HTTP, WebSocket, a test harness) decodes bytes into a
//! [`Request`], hands it to the dispatcher, and encodes the [`Response`]
//! it gets back. There is one request variant per core operation.
//!
//! Both enums are internally tagged, so a request looks like:
//!
//! ```json
//! { "type": "join_room", "room_id": "K3X9QZ", "handle": "alice" }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    Handle, Letter, PlayerStats, RoomId, RoomListEntry, RoomSnapshot,
    RoomStatus,
};

/// Everything a client can ask of the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Open a new room. `handle` becomes its first player and creator.
    CreateRoom {
        name: String,
        max_players: usize,
        handle: Handle,
    },

    /// Take a seat (and a card) in an existing room.
    JoinRoom { room_id: RoomId, handle: Handle },

    /// Move a waiting room into play.
    StartGame { room_id: RoomId, handle: Handle },

    /// Draw the next number.
    CallNumber { room_id: RoomId, handle: Handle },

    /// Claim a win for `handle`'s card.
    CheckBingo { room_id: RoomId, handle: Handle },

    /// Read a room's current snapshot.
    GetRoom { room_id: RoomId },

    /// List rooms. `None` lists every room regardless of status.
    ListRooms {
        #[serde(default)]
        status: Option<RoomStatus>,
    },

    /// Top players across all rooms.
    Leaderboard {
        #[serde(default)]
        limit: Option<usize>,
    },
}

/// What the core answers with. Each request maps to exactly one success
/// variant, or to [`Response::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    RoomCreated {
        room_id: RoomId,
    },
    Joined {
        room_id: RoomId,
        /// `true` when the handle was already seated; nothing changed.
        already_member: bool,
    },
    GameStarted {
        room_id: RoomId,
        status: RoomStatus,
    },
    NumberCalled {
        letter: Letter,
        number: u8,
        called_numbers: Vec<u8>,
    },
    BingoChecked {
        has_bingo: bool,
        winner: Option<Handle>,
        status: RoomStatus,
    },
    Room {
        room: RoomSnapshot,
    },
    RoomList {
        rooms: Vec<RoomListEntry>,
    },
    Leaderboard {
        entries: Vec<PlayerStats>,
    },
    Error(ErrorBody),
}

/// A rejected request.
///
/// `code` is stable and machine-readable (`"not_found"`, `"cooldown"`, etc.);
/// `message` is for humans. `remaining_secs` is only present for cooldown
/// rejections and tells the caller how long to wait before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_is_internally_tagged() {
        let req = Request::JoinRoom {
            room_id: RoomId::from("ABC123"),
            handle: Handle::new("alice").unwrap(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "join_room");
        assert_eq!(json["room_id"], "ABC123");
        assert_eq!(json["handle"], "alice");
    }

    #[test]
    fn test_list_rooms_status_defaults_to_none() {
        let req: Request =
            serde_json::from_str(r#"{"type":"list_rooms"}"#).unwrap();
        assert_eq!(req, Request::ListRooms { status: None });

        let req: Request = serde_json::from_str(
            r#"{"type":"list_rooms","status":"Waiting"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::ListRooms {
                status: Some(RoomStatus::Waiting)
            }
        );
    }

    #[test]
    fn test_request_with_missing_field_fails() {
        let result = serde_json::from_str::<Request>(
            r#"{"type":"create_room","name":"Friday","handle":"alice"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_request_with_blank_handle_fails() {
        let result = serde_json::from_str::<Request>(
            r#"{"type":"start_game","room_id":"ABC123","handle":""}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_error_body_omits_absent_remaining_secs() {
        let resp = Response::Error(ErrorBody {
            code: "not_found".into(),
            message: "room XYZ not found".into(),
            remaining_secs: None,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "not_found");
        assert!(json.get("remaining_secs").is_none());
    }

    #[test]
    fn test_cooldown_error_carries_remaining_secs() {
        let resp = Response::Error(ErrorBody {
            code: "cooldown".into(),
            message: "wait".into(),
            remaining_secs: Some(3),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["remaining_secs"], 3);
    }
}
