//! Room registry: creates rooms, hands out ids, and routes operations.

use std::collections::HashMap;
use std::sync::Arc;

use bingohall_protocol::{
    Handle, PlayerStats, RoomId, RoomListEntry, RoomSnapshot, RoomStatus,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{RwLock, watch};

use crate::clock::{Clock, TokioClock};
use crate::room::{BingoCheck, CallOutcome, JoinOutcome, Room, RoomHandle, spawn_room};
use crate::stats::{MemoryStatsStore, StatsStore};
use crate::{RoomConfig, RoomError};

/// Characters room ids are built from: uppercase base36.
const ROOM_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a generated room id.
const ROOM_ID_LEN: usize = 6;

/// Owns every live room for the lifetime of the service.
///
/// This is the entry point for room operations from higher layers. It is
/// `Sync` and meant to be shared behind an `Arc`: the room map is behind
/// an `RwLock` that is only held to look up or insert a handle, never
/// across a room operation, so work on different rooms runs in parallel.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    config: RoomConfig,
    stats: Arc<dyn StatsStore>,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    /// A registry with in-memory stats and Tokio's clock.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(MemoryStatsStore::new()),
            Arc::new(TokioClock),
        )
    }

    /// A registry with caller-supplied stats storage and clock.
    pub fn with_collaborators(
        config: RoomConfig,
        stats: Arc<dyn StatsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            stats,
            clock,
        }
    }

    /// The policy every room in this registry runs with.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `creator` seated and returns its id.
    ///
    /// # Errors
    /// [`RoomError::Validation`] if the name or player limit is unusable.
    pub async fn create_room(
        &self,
        name: &str,
        max_players: usize,
        creator: Handle,
    ) -> Result<RoomId, RoomError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());

        let mut rooms = self.rooms.write().await;
        let room_id = loop {
            let candidate = generate_room_id(&mut rng);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let room = Room::new(
            room_id.clone(),
            name,
            max_players,
            creator.clone(),
            self.config.clone(),
            rng,
        )?;
        let handle = spawn_room(room, Arc::clone(&self.clock), self.config.command_buffer);
        rooms.insert(room_id.clone(), handle);
        drop(rooms);

        self.stats.record_game_joined(&creator);
        tracing::info!(%room_id, %creator, max_players, "room created");
        Ok(room_id)
    }

    /// Looks up a room's handle.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room is live.
    pub async fn find(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Seats `handle` in a room. Newly seated players are credited a game
    /// in the stats store; repeat joins are not.
    pub async fn join(
        &self,
        room_id: &RoomId,
        handle: Handle,
    ) -> Result<JoinOutcome, RoomError> {
        let room = self.find(room_id).await?;
        let outcome = room.join(handle.clone()).await?;
        if outcome == JoinOutcome::Joined {
            self.stats.record_game_joined(&handle);
        }
        Ok(outcome)
    }

    /// Starts the game in a waiting room.
    pub async fn start(
        &self,
        room_id: &RoomId,
        requester: Handle,
    ) -> Result<RoomStatus, RoomError> {
        self.find(room_id).await?.start(requester).await
    }

    /// Calls the next number in a room.
    pub async fn call_number(
        &self,
        room_id: &RoomId,
        requester: Handle,
    ) -> Result<CallOutcome, RoomError> {
        self.find(room_id).await?.call_number(requester).await
    }

    /// Checks a win claim. A confirmed win is reported to the stats store.
    pub async fn check_bingo(
        &self,
        room_id: &RoomId,
        handle: Handle,
    ) -> Result<BingoCheck, RoomError> {
        let room = self.find(room_id).await?;
        let check = room.check_bingo(handle.clone()).await?;
        if check.has_bingo {
            self.stats.record_win(&handle, self.config.win_points);
        }
        Ok(check)
    }

    /// The room's latest published snapshot.
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<Arc<RoomSnapshot>, RoomError> {
        Ok(self.find(room_id).await?.snapshot())
    }

    /// Subscribes to a room's snapshots.
    pub async fn subscribe(
        &self,
        room_id: &RoomId,
    ) -> Result<watch::Receiver<Arc<RoomSnapshot>>, RoomError> {
        Ok(self.find(room_id).await?.subscribe())
    }

    /// Lists rooms, optionally only those in one status, oldest first.
    ///
    /// Reads each room's published snapshot, so this never queues behind
    /// room operations.
    pub async fn list_by_status(&self, status: Option<RoomStatus>) -> Vec<RoomListEntry> {
        let mut snapshots: Vec<Arc<RoomSnapshot>> = self
            .rooms
            .read()
            .await
            .values()
            .map(RoomHandle::snapshot)
            .filter(|snap| status.is_none_or(|s| snap.status == s))
            .collect();
        snapshots.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.room_id.cmp(&b.room_id))
        });
        snapshots.iter().map(|snap| snap.to_list_entry()).collect()
    }

    /// Rooms still accepting their first players.
    pub async fn list_joinable(&self) -> Vec<RoomListEntry> {
        self.list_by_status(Some(RoomStatus::Waiting)).await
    }

    /// Cross-room totals for one handle.
    pub fn player_stats(&self, handle: &Handle) -> Option<PlayerStats> {
        self.stats.get(handle)
    }

    /// The top `limit` players across all rooms.
    pub fn leaderboard(&self, limit: usize) -> Vec<PlayerStats> {
        self.stats.leaderboard(limit)
    }

    /// Stops a room and forgets it.
    pub async fn remove_room(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room removed");
        Ok(())
    }

    /// Stops every room. Call on service shutdown.
    pub async fn shutdown(&self) {
        let handles: Vec<RoomHandle> =
            self.rooms.write().await.drain().map(|(_, h)| h).collect();
        let count = handles.len();
        for handle in handles {
            let _ = handle.shutdown().await;
        }
        tracing::info!(rooms = count, "registry shut down");
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

fn generate_room_id<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    let id: String = (0..ROOM_ID_LEN)
        .map(|_| {
            let i = rng.random_range(0..ROOM_ID_ALPHABET.len());
            char::from(ROOM_ID_ALPHABET[i])
        })
        .collect();
    RoomId::from(id)
}
