//! Room state machine and the actor that serializes access to it.
//!
//! [`Room`] is the plain, synchronous game state for one room: roster,
//! cards, called numbers, lifecycle. It knows nothing about tasks.
//!
//! Each room runs in its own Tokio task that owns its `Room` and handles
//! one command at a time from an mpsc channel. That gives every operation
//! exclusive access to the room without a lock, and rooms never wait on
//! each other. After each successful change the actor publishes a fresh
//! [`RoomSnapshot`] on a watch channel, which is what readers look at.

use std::sync::Arc;
use std::time::Instant;

use bingohall_protocol::{
    Card, Handle, LatestCall, Letter, PlayerSnapshot, RoomId, RoomSnapshot,
    RoomStatus,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot, watch};

use crate::caller::{CallError, CallSequencer};
use crate::card::generate_card;
use crate::clock::Clock;
use crate::pattern::has_winning_pattern;
use crate::{RoomConfig, RoomError};

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// How a join went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new seat and card were created.
    Joined,
    /// The handle was already seated; nothing changed.
    AlreadyMember,
}

/// A successful call, plus everything called so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub number: u8,
    pub letter: Letter,
    pub called_numbers: Vec<u8>,
}

/// The verdict on a win claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCheck {
    pub has_bingo: bool,
    /// Set only when this claim won.
    pub winner: Option<Handle>,
    /// Room status after the check.
    pub status: RoomStatus,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Player {
    handle: Handle,
    score: u32,
    bingos: u32,
    card: Card,
}

/// One room's full game state.
///
/// Every method either applies its whole change or returns an error
/// having changed nothing.
#[derive(Debug)]
pub struct Room {
    room_id: RoomId,
    name: String,
    max_players: usize,
    created_at: DateTime<Utc>,
    status: RoomStatus,
    /// Join order. Index 0 is the creator.
    players: Vec<Player>,
    sequencer: CallSequencer,
    latest_call: Option<LatestCall>,
    winner: Option<Handle>,
    config: RoomConfig,
    rng: StdRng,
}

impl Room {
    /// Opens a room in `Waiting` with `creator` already seated.
    ///
    /// # Errors
    /// [`RoomError::Validation`] if `name` is blank or `max_players` is
    /// zero or above `config.max_players_cap`.
    pub fn new(
        room_id: RoomId,
        name: &str,
        max_players: usize,
        creator: Handle,
        config: RoomConfig,
        mut rng: StdRng,
    ) -> Result<Self, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::Validation("room name is required".into()));
        }
        if max_players < 1 {
            return Err(RoomError::Validation(
                "max_players must be at least 1".into(),
            ));
        }
        if max_players > config.max_players_cap {
            return Err(RoomError::Validation(format!(
                "max_players must be at most {}",
                config.max_players_cap
            )));
        }

        let card = generate_card(&mut rng);
        Ok(Self {
            room_id,
            name: name.to_owned(),
            max_players,
            created_at: Utc::now(),
            status: RoomStatus::Waiting,
            players: vec![Player {
                handle: creator,
                score: 0,
                bingos: 0,
                card,
            }],
            sequencer: CallSequencer::new(config.call_cooldown),
            latest_call: None,
            winner: None,
            config,
            rng,
        })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    /// Seats `handle` with a fresh card.
    ///
    /// Joining twice is harmless: an existing member gets
    /// [`JoinOutcome::AlreadyMember`] even when the room is full.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyFinished`] once the game is over
    /// - [`RoomError::RoomFull`] if every seat is taken
    pub fn join(&mut self, handle: Handle) -> Result<JoinOutcome, RoomError> {
        if self.status.is_terminal() {
            return Err(RoomError::AlreadyFinished(self.room_id.clone()));
        }
        if self.player_index(&handle).is_some() {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if self.players.len() >= self.max_players {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }

        let card = generate_card(&mut self.rng);
        self.players.push(Player {
            handle,
            score: 0,
            bingos: 0,
            card,
        });
        Ok(JoinOutcome::Joined)
    }

    /// Moves the room from `Waiting` to `InProgress`.
    ///
    /// # Errors
    /// - [`RoomError::InvalidState`] unless the room is waiting
    /// - [`RoomError::Forbidden`] if starting is creator-only and
    ///   `requester` didn't create the room
    pub fn start(&mut self, requester: &Handle) -> Result<RoomStatus, RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::InvalidState(format!(
                "cannot start a room that is {}",
                self.status
            )));
        }
        if self.config.creator_only_start && !self.is_creator(requester) {
            return Err(RoomError::Forbidden(requester.clone()));
        }
        self.advance(RoomStatus::InProgress)?;
        Ok(self.status)
    }

    /// Draws the next number at time `now`.
    ///
    /// # Errors
    /// - [`RoomError::InvalidState`] unless the game is in progress
    /// - [`RoomError::Forbidden`] if calling is creator-only
    /// - [`RoomError::Cooldown`] if the last call was too recent
    /// - [`RoomError::Exhausted`] if all numbers are out
    pub fn call_number(
        &mut self,
        requester: &Handle,
        now: Instant,
    ) -> Result<CallOutcome, RoomError> {
        if self.status != RoomStatus::InProgress {
            return Err(RoomError::InvalidState(format!(
                "cannot call numbers while the room is {}",
                self.status
            )));
        }
        if self.config.creator_only_call && !self.is_creator(requester) {
            return Err(RoomError::Forbidden(requester.clone()));
        }

        let call = self
            .sequencer
            .draw_next(now, &mut self.rng)
            .map_err(|e| match e {
                CallError::Cooldown { remaining } => RoomError::Cooldown { remaining },
                CallError::Exhausted => RoomError::Exhausted(self.room_id.clone()),
            })?;

        self.latest_call = Some(LatestCall {
            letter: call.letter,
            number: call.number,
            called_at: Utc::now(),
        });

        Ok(CallOutcome {
            number: call.number,
            letter: call.letter,
            called_numbers: self.sequencer.called().to_vec(),
        })
    }

    /// Checks `handle`'s card against the numbers called so far.
    ///
    /// A winning claim finishes the room and awards the player. A losing
    /// claim changes nothing and the player may claim again later.
    ///
    /// # Errors
    /// - [`RoomError::InvalidState`] unless the game is in progress
    /// - [`RoomError::PlayerNotFound`] if `handle` has no seat
    pub fn check_bingo(&mut self, handle: &Handle) -> Result<BingoCheck, RoomError> {
        if self.status != RoomStatus::InProgress {
            return Err(RoomError::InvalidState(format!(
                "cannot check a claim while the room is {}",
                self.status
            )));
        }
        let index = self.player_index(handle).ok_or_else(|| {
            RoomError::PlayerNotFound(handle.clone(), self.room_id.clone())
        })?;

        if !has_winning_pattern(&self.players[index].card, self.sequencer.called()) {
            return Ok(BingoCheck {
                has_bingo: false,
                winner: None,
                status: self.status,
            });
        }

        self.advance(RoomStatus::Finished)?;
        let player = &mut self.players[index];
        player.score = player.score.saturating_add(self.config.win_points);
        player.bingos = player.bingos.saturating_add(1);
        self.winner = Some(handle.clone());

        Ok(BingoCheck {
            has_bingo: true,
            winner: self.winner.clone(),
            status: self.status,
        })
    }

    /// A full copy of the room's current state.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            name: self.name.clone(),
            max_players: self.max_players,
            status: self.status,
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    handle: p.handle.clone(),
                    score: p.score,
                    bingos: p.bingos,
                    card: p.card.clone(),
                })
                .collect(),
            called_numbers: self.sequencer.called().to_vec(),
            latest_call: self.latest_call.clone(),
            winner: self.winner.clone(),
            created_at: self.created_at,
        }
    }

    fn player_index(&self, handle: &Handle) -> Option<usize> {
        self.players.iter().position(|p| &p.handle == handle)
    }

    fn is_creator(&self, handle: &Handle) -> bool {
        self.players.first().is_some_and(|p| &p.handle == handle)
    }

    fn advance(&mut self, target: RoomStatus) -> Result<(), RoomError> {
        if !self.status.can_transition_to(target) {
            return Err(RoomError::InvalidState(format!(
                "cannot go from {} to {}",
                self.status, target
            )));
        }
        self.status = target;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    Join {
        handle: Handle,
        reply: Reply<JoinOutcome>,
    },
    Start {
        requester: Handle,
        reply: Reply<RoomStatus>,
    },
    CallNumber {
        requester: Handle,
        reply: Reply<CallOutcome>,
    },
    CheckBingo {
        handle: Handle,
        reply: Reply<BingoCheck>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: an mpsc sender plus a watch receiver. The registry
/// holds one per room and hands out clones.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
    snapshots: watch::Receiver<Arc<RoomSnapshot>>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub async fn join(&self, handle: Handle) -> Result<JoinOutcome, RoomError> {
        self.request(|reply| RoomCommand::Join { handle, reply }).await
    }

    pub async fn start(&self, requester: Handle) -> Result<RoomStatus, RoomError> {
        self.request(|reply| RoomCommand::Start { requester, reply }).await
    }

    pub async fn call_number(&self, requester: Handle) -> Result<CallOutcome, RoomError> {
        self.request(|reply| RoomCommand::CallNumber { requester, reply }).await
    }

    pub async fn check_bingo(&self, handle: Handle) -> Result<BingoCheck, RoomError> {
        self.request(|reply| RoomCommand::CheckBingo { handle, reply }).await
    }

    /// The most recently published snapshot. Never waits on the actor.
    pub fn snapshot(&self) -> Arc<RoomSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// A receiver that wakes on every published snapshot, for pushing
    /// room state out to clients.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RoomSnapshot>> {
        self.snapshots.clone()
    }

    /// Tells the room to stop. Its last snapshot stays readable.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }
}

/// The task-side half: owns the room and drains the command channel.
struct RoomActor {
    room: Room,
    clock: Arc<dyn Clock>,
    receiver: mpsc::Receiver<RoomCommand>,
    snapshots: watch::Sender<Arc<RoomSnapshot>>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self) {
        let room_id = self.room.room_id().clone();
        tracing::info!(%room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { handle, reply } => {
                    let result = self.handle_join(handle);
                    let _ = reply.send(result);
                }
                RoomCommand::Start { requester, reply } => {
                    let result = self.handle_start(requester);
                    let _ = reply.send(result);
                }
                RoomCommand::CallNumber { requester, reply } => {
                    let result = self.handle_call(requester);
                    let _ = reply.send(result);
                }
                RoomCommand::CheckBingo { handle, reply } => {
                    let result = self.handle_check(handle);
                    let _ = reply.send(result);
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle_join(&mut self, handle: Handle) -> Result<JoinOutcome, RoomError> {
        let outcome = self.room.join(handle.clone())?;
        if outcome == JoinOutcome::Joined {
            self.publish();
            tracing::info!(
                room_id = %self.room.room_id(),
                %handle,
                "player joined"
            );
        }
        Ok(outcome)
    }

    fn handle_start(&mut self, requester: Handle) -> Result<RoomStatus, RoomError> {
        let status = self.room.start(&requester)?;
        self.publish();
        tracing::info!(
            room_id = %self.room.room_id(),
            %requester,
            "game started"
        );
        Ok(status)
    }

    fn handle_call(&mut self, requester: Handle) -> Result<CallOutcome, RoomError> {
        let now = self.clock.now();
        let outcome = self.room.call_number(&requester, now)?;
        self.publish();
        tracing::debug!(
            room_id = %self.room.room_id(),
            letter = %outcome.letter,
            number = outcome.number,
            called = outcome.called_numbers.len(),
            "number called"
        );
        Ok(outcome)
    }

    fn handle_check(&mut self, handle: Handle) -> Result<BingoCheck, RoomError> {
        let check = self.room.check_bingo(&handle)?;
        if check.has_bingo {
            self.publish();
            tracing::info!(room_id = %self.room.room_id(), %handle, "bingo confirmed");
        } else {
            tracing::debug!(room_id = %self.room.room_id(), %handle, "bingo claim rejected");
        }
        Ok(check)
    }

    fn publish(&self) {
        self.snapshots.send_replace(Arc::new(self.room.snapshot()));
    }
}

/// Spawns the actor task for `room` and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it fills.
pub(crate) fn spawn_room(
    room: Room,
    clock: Arc<dyn Clock>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (snap_tx, snap_rx) = watch::channel(Arc::new(room.snapshot()));
    let room_id = room.room_id().clone();

    let actor = RoomActor {
        room,
        clock,
        receiver: rx,
        snapshots: snap_tx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
        snapshots: snap_rx,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;

    use super::*;

    fn h(name: &str) -> Handle {
        Handle::new(name).unwrap()
    }

    fn room_with(config: RoomConfig, max_players: usize) -> Room {
        Room::new(
            RoomId::from("TEST01"),
            "Friday night",
            max_players,
            h("alice"),
            config,
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    fn room(max_players: usize) -> Room {
        room_with(RoomConfig::default(), max_players)
    }

    #[test]
    fn test_new_room_seats_creator() {
        let room = room(4);
        let snap = room.snapshot();
        assert_eq!(snap.status, RoomStatus::Waiting);
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.creator(), Some(&h("alice")));
        assert!(snap.called_numbers.is_empty());
        assert_eq!(snap.winner, None);
    }

    #[test]
    fn test_new_room_validation() {
        let make = |name: &str, max: usize| {
            Room::new(
                RoomId::from("X"),
                name,
                max,
                h("alice"),
                RoomConfig::default(),
                StdRng::seed_from_u64(0),
            )
        };
        assert!(matches!(make("  ", 4), Err(RoomError::Validation(_))));
        assert!(matches!(make("ok", 0), Err(RoomError::Validation(_))));
        assert!(matches!(make("ok", 101), Err(RoomError::Validation(_))));
        assert!(make("ok", 1).is_ok());
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut room = room(4);
        assert_eq!(room.join(h("bob")).unwrap(), JoinOutcome::Joined);
        let card = room.snapshot().player(&h("bob")).unwrap().card.clone();

        assert_eq!(room.join(h("bob")).unwrap(), JoinOutcome::AlreadyMember);
        let snap = room.snapshot();
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.player(&h("bob")).unwrap().card, card);
    }

    #[test]
    fn test_full_room_rejects_newcomer_but_not_member() {
        let mut room = room(2);
        room.join(h("bob")).unwrap();
        assert_eq!(
            room.join(h("carol")),
            Err(RoomError::RoomFull(RoomId::from("TEST01")))
        );
        assert_eq!(room.join(h("bob")).unwrap(), JoinOutcome::AlreadyMember);
        assert_eq!(room.join(h("alice")).unwrap(), JoinOutcome::AlreadyMember);
    }

    #[test]
    fn test_late_join_while_in_progress() {
        let mut room = room(3);
        room.start(&h("alice")).unwrap();
        assert_eq!(room.join(h("bob")).unwrap(), JoinOutcome::Joined);
    }

    #[test]
    fn test_start_only_from_waiting() {
        let mut room = room(2);
        assert_eq!(room.start(&h("bob")).unwrap(), RoomStatus::InProgress);
        assert!(matches!(
            room.start(&h("alice")),
            Err(RoomError::InvalidState(_))
        ));
    }

    #[test]
    fn test_creator_only_start() {
        let config = RoomConfig {
            creator_only_start: true,
            ..RoomConfig::default()
        };
        let mut room = room_with(config, 2);
        room.join(h("bob")).unwrap();
        assert_eq!(room.start(&h("bob")), Err(RoomError::Forbidden(h("bob"))));
        assert_eq!(room.status(), RoomStatus::Waiting);
        room.start(&h("alice")).unwrap();
    }

    #[test]
    fn test_call_requires_in_progress() {
        let mut room = room(2);
        assert!(matches!(
            room.call_number(&h("alice"), Instant::now()),
            Err(RoomError::InvalidState(_))
        ));
    }

    #[test]
    fn test_creator_only_call() {
        let config = RoomConfig {
            creator_only_call: true,
            ..RoomConfig::default()
        };
        let mut room = room_with(config, 2);
        room.join(h("bob")).unwrap();
        room.start(&h("bob")).unwrap();
        assert_eq!(
            room.call_number(&h("bob"), Instant::now()),
            Err(RoomError::Forbidden(h("bob")))
        );
        room.call_number(&h("alice"), Instant::now()).unwrap();
    }

    #[test]
    fn test_call_cooldown_and_latest_call() {
        let mut room = room(2);
        room.start(&h("alice")).unwrap();
        let t0 = Instant::now();

        let first = room.call_number(&h("alice"), t0).unwrap();
        assert_eq!(first.called_numbers, vec![first.number]);
        let latest = room.snapshot().latest_call.unwrap();
        assert_eq!((latest.letter, latest.number), (first.letter, first.number));

        let err = room
            .call_number(&h("alice"), t0 + Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err.remaining_secs(), Some(4));
        assert_eq!(room.snapshot().called_numbers.len(), 1);

        let second = room
            .call_number(&h("alice"), t0 + Duration::from_secs(5))
            .unwrap();
        assert_ne!(second.number, first.number);
        assert_eq!(second.called_numbers.len(), 2);
    }

    #[test]
    fn test_exhausted_after_every_number() {
        let config = RoomConfig {
            call_cooldown: Duration::ZERO,
            ..RoomConfig::default()
        };
        let mut room = room_with(config, 1);
        room.start(&h("alice")).unwrap();
        let now = Instant::now();
        for _ in 0..75 {
            room.call_number(&h("alice"), now).unwrap();
        }
        assert_eq!(
            room.call_number(&h("alice"), now),
            Err(RoomError::Exhausted(RoomId::from("TEST01")))
        );
    }

    #[test]
    fn test_check_bingo_before_start_is_invalid_state() {
        let mut room = room(2);
        assert!(matches!(
            room.check_bingo(&h("alice")),
            Err(RoomError::InvalidState(_))
        ));
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert_eq!(room.snapshot().player(&h("alice")).unwrap().score, 0);
    }

    #[test]
    fn test_check_bingo_unknown_player() {
        let mut room = room(2);
        room.start(&h("alice")).unwrap();
        assert!(matches!(
            room.check_bingo(&h("mallory")),
            Err(RoomError::PlayerNotFound(..))
        ));
    }

    #[test]
    fn test_false_claim_changes_nothing() {
        let mut room = room(2);
        room.start(&h("alice")).unwrap();
        let check = room.check_bingo(&h("alice")).unwrap();
        assert!(!check.has_bingo);
        assert_eq!(check.status, RoomStatus::InProgress);
        assert_eq!(room.snapshot().player(&h("alice")).unwrap().score, 0);
    }

    #[test]
    fn test_confirmed_claim_finishes_room() {
        let config = RoomConfig {
            call_cooldown: Duration::ZERO,
            ..RoomConfig::default()
        };
        let mut room = room_with(config, 2);
        room.join(h("bob")).unwrap();
        room.start(&h("alice")).unwrap();

        let now = Instant::now();
        let check = loop {
            room.call_number(&h("alice"), now).unwrap();
            let check = room.check_bingo(&h("bob")).unwrap();
            if check.has_bingo {
                break check;
            }
        };

        assert_eq!(check.winner, Some(h("bob")));
        assert_eq!(check.status, RoomStatus::Finished);
        let snap = room.snapshot();
        assert_eq!(snap.winner, Some(h("bob")));
        let bob = snap.player(&h("bob")).unwrap();
        assert_eq!((bob.score, bob.bingos), (100, 1));

        assert!(matches!(
            room.check_bingo(&h("alice")),
            Err(RoomError::InvalidState(_))
        ));
        assert!(matches!(
            room.call_number(&h("alice"), now),
            Err(RoomError::InvalidState(_))
        ));
        assert!(matches!(
            room.join(h("carol")),
            Err(RoomError::AlreadyFinished(_))
        ));
        assert!(matches!(
            room.join(h("bob")),
            Err(RoomError::AlreadyFinished(_))
        ));
    }
}
