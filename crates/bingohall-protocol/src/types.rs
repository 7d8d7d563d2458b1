//! Core value types for Bingohall's wire format.
//!
//! These are the structures that the game core publishes (snapshots,
//! stats) and accepts (identities). Everything here is plain data with
//! validation at construction time; no type in this module knows how a
//! room is locked or how numbers are drawn.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Value domain
// ---------------------------------------------------------------------------

/// Highest number that can be called. The domain is `1..=MAX_NUMBER`.
pub const MAX_NUMBER: u8 = 75;

/// Width of each letter's band. `MAX_NUMBER` splits into five of these.
pub const NUMBERS_PER_LETTER: u8 = 15;

/// Cards are `CARD_SIZE` letters wide and `CARD_SIZE` positions tall.
pub const CARD_SIZE: usize = 5;

/// `(letter index, position)` of the free cell: the middle of column N.
pub const FREE_CELL: (usize, usize) = (2, 2);

/// The marker the free cell serializes as.
const FREE_MARKER: &str = "FREE";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A short, shareable room identifier such as `"K3X9QZ"`.
///
/// Room ids are generated by the registry; the protocol layer treats them
/// as opaque strings. An id that does not name a live room is not a
/// protocol error, it is a `NotFound` from the room layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's display handle. It doubles as their identity inside a room
/// and as the key of their cross-room stats.
///
/// The only rule is "not blank". Serde goes through [`Handle::new`], so a
/// request carrying `"handle": "  "` fails to decode instead of reaching
/// a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Validates and wraps a handle.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidValue`] if the handle is empty or
    /// only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ProtocolError::InvalidValue(
                "handle must not be empty".into(),
            ));
        }
        Ok(Self(raw))
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Letter: the category of a number
// ---------------------------------------------------------------------------

/// One of the five card columns. Each letter owns a contiguous band of
/// [`NUMBERS_PER_LETTER`] numbers: B is 1-15, I is 16-30, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    B,
    I,
    N,
    G,
    O,
}

impl Letter {
    /// All letters in column order.
    pub const ALL: [Letter; CARD_SIZE] =
        [Letter::B, Letter::I, Letter::N, Letter::G, Letter::O];

    /// Column index of this letter (B = 0 through O = 4).
    pub fn index(self) -> usize {
        self as usize
    }

    /// The letter at a column index, if the index is on the card.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The letter whose band contains `number`, or `None` if the number
    /// is outside `1..=MAX_NUMBER`.
    pub fn for_number(number: u8) -> Option<Self> {
        if number == 0 || number > MAX_NUMBER {
            return None;
        }
        Self::from_index(usize::from((number - 1) / NUMBERS_PER_LETTER))
    }

    /// The inclusive band of numbers this letter's column draws from.
    pub fn range(self) -> RangeInclusive<u8> {
        // index() < CARD_SIZE, so this fits in a u8.
        let low = self.index() as u8 * NUMBERS_PER_LETTER + 1;
        low..=low + NUMBERS_PER_LETTER - 1
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::B => "B",
            Self::I => "I",
            Self::N => "N",
            Self::G => "G",
            Self::O => "O",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single square on a card.
///
/// On the wire a numbered cell is a plain JSON number and the free cell
/// is the string `"FREE"`, so a column looks like `[33, 40, "FREE", 31, 44]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCell", into = "RawCell")]
pub enum Cell {
    /// A number the player needs to hear called.
    Number(u8),
    /// Always satisfied. Exactly one per card.
    Free,
}

impl Cell {
    /// The cell's number, or `None` for the free cell.
    pub fn number(self) -> Option<u8> {
        match self {
            Self::Number(n) => Some(n),
            Self::Free => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(u8),
    Marker(String),
}

impl From<Cell> for RawCell {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Number(n) => RawCell::Number(n),
            Cell::Free => RawCell::Marker(FREE_MARKER.to_owned()),
        }
    }
}

impl TryFrom<RawCell> for Cell {
    type Error = ProtocolError;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        match raw {
            RawCell::Number(n) if (1..=MAX_NUMBER).contains(&n) => {
                Ok(Cell::Number(n))
            }
            RawCell::Number(n) => Err(ProtocolError::InvalidValue(format!(
                "cell number {n} outside 1..={MAX_NUMBER}"
            ))),
            RawCell::Marker(m) if m == FREE_MARKER => Ok(Cell::Free),
            RawCell::Marker(m) => Err(ProtocolError::InvalidValue(format!(
                "unknown cell marker {m:?}"
            ))),
        }
    }
}

/// A player's 5×5 card, stored column-major: `columns[letter][position]`.
///
/// Construction always validates the layout, so any `Card` value you hold
/// has 24 distinct numbers, each inside its letter's band, and exactly one
/// free cell at [`FREE_CELL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardColumns", into = "CardColumns")]
pub struct Card {
    columns: [[Cell; CARD_SIZE]; CARD_SIZE],
}

impl Card {
    /// Builds a card from its columns, checking every layout rule.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidValue`] if the free cell is missing
    /// or misplaced, a number sits in the wrong column, or a number repeats.
    pub fn from_columns(
        columns: [[Cell; CARD_SIZE]; CARD_SIZE],
    ) -> Result<Self, ProtocolError> {
        let mut seen = [false; MAX_NUMBER as usize + 1];

        for (letter, column) in Letter::ALL.iter().zip(columns.iter()) {
            for (position, cell) in column.iter().enumerate() {
                let is_free_slot = (letter.index(), position) == FREE_CELL;
                match *cell {
                    Cell::Free if is_free_slot => {}
                    Cell::Free => {
                        return Err(ProtocolError::InvalidValue(format!(
                            "free cell at {letter}{position}"
                        )));
                    }
                    Cell::Number(_) if is_free_slot => {
                        return Err(ProtocolError::InvalidValue(
                            "middle cell must be free".into(),
                        ));
                    }
                    Cell::Number(n) => {
                        if !letter.range().contains(&n) {
                            return Err(ProtocolError::InvalidValue(format!(
                                "{n} does not belong in column {letter}"
                            )));
                        }
                        if std::mem::replace(&mut seen[usize::from(n)], true) {
                            return Err(ProtocolError::InvalidValue(format!(
                                "{n} appears twice"
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self { columns })
    }

    /// The cell at a given letter and position, or `None` if `position`
    /// is off the card.
    pub fn cell(&self, letter: Letter, position: usize) -> Option<Cell> {
        self.columns[letter.index()].get(position).copied()
    }

    /// One letter's column, top to bottom.
    pub fn column(&self, letter: Letter) -> &[Cell; CARD_SIZE] {
        &self.columns[letter.index()]
    }

    /// All 24 numbers on the card, column by column.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.columns.iter().flatten().filter_map(|cell| cell.number())
    }
}

/// The original wire shape of a card: one array per letter.
#[derive(Serialize, Deserialize)]
struct CardColumns {
    #[serde(rename = "B")]
    b: [Cell; CARD_SIZE],
    #[serde(rename = "I")]
    i: [Cell; CARD_SIZE],
    #[serde(rename = "N")]
    n: [Cell; CARD_SIZE],
    #[serde(rename = "G")]
    g: [Cell; CARD_SIZE],
    #[serde(rename = "O")]
    o: [Cell; CARD_SIZE],
}

impl From<Card> for CardColumns {
    fn from(card: Card) -> Self {
        let [b, i, n, g, o] = card.columns;
        Self { b, i, n, g, o }
    }
}

impl TryFrom<CardColumns> for Card {
    type Error = ProtocolError;

    fn try_from(raw: CardColumns) -> Result<Self, Self::Error> {
        Card::from_columns([raw.b, raw.i, raw.n, raw.g, raw.o])
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions are strictly ordered and never reverse:
///
/// ```text
/// Waiting → InProgress → Finished
/// ```
///
/// - **Waiting**: room exists, players join, nothing is called yet.
/// - **InProgress**: numbers are being called and claims are checked.
/// - **Finished**: someone won. The room is read-only from here on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Finished,
}

impl RoomStatus {
    /// Returns the state that follows this one, or `None` for `Finished`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal single step.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` once the room has a winner and no longer changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// The most recent call in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestCall {
    pub letter: Letter,
    pub number: u8,
    /// Wall-clock time of the call, for display. Cooldowns are measured
    /// on a monotonic clock inside the room, not from this field.
    pub called_at: DateTime<Utc>,
}

/// One roster entry as seen from outside the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub handle: Handle,
    pub score: u32,
    pub bingos: u32,
    pub card: Card,
}

/// A point-in-time copy of a room's full state.
///
/// Published by the room after every successful change, so readers
/// never wait on (or block) the room to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub name: String,
    pub max_players: usize,
    pub status: RoomStatus,
    /// Roster in join order. The first entry created the room.
    pub players: Vec<PlayerSnapshot>,
    /// Every number called so far, in call order.
    pub called_numbers: Vec<u8>,
    pub latest_call: Option<LatestCall>,
    pub winner: Option<Handle>,
    pub created_at: DateTime<Utc>,
}

impl RoomSnapshot {
    /// The handle that created the room (first on the roster).
    pub fn creator(&self) -> Option<&Handle> {
        self.players.first().map(|p| &p.handle)
    }

    /// Looks up a roster entry by handle.
    pub fn player(&self, handle: &Handle) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| &p.handle == handle)
    }

    /// Shrinks the snapshot to the summary used in room listings.
    pub fn to_list_entry(&self) -> RoomListEntry {
        RoomListEntry {
            room_id: self.room_id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            max_players: self.max_players,
            status: self.status,
        }
    }
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatus,
}

/// Cross-room totals for one handle. Rows of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub handle: Handle,
    pub total_score: u64,
    pub total_bingos: u64,
    pub games_played: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =========================================================================
// Tests
// =========================================================================
