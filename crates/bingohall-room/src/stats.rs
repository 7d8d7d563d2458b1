//! Cross-room player statistics.
//!
//! Rooms don't need stats to play correctly. The registry reports joins
//! and wins into a [`StatsStore`] after the room has already committed the
//! change, and the leaderboard reads from it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bingohall_protocol::{Handle, PlayerStats};
use chrono::Utc;

/// Where player totals live.
///
/// Implementations must be cheap and non-blocking: they are called from
/// request handlers, never while a room is mid-operation. A database
/// backed store would queue writes rather than await them here.
pub trait StatsStore: Send + Sync + 'static {
    /// Credits `handle` with one more game played, creating their row
    /// if this is the first time we've seen them.
    fn record_game_joined(&self, handle: &Handle);

    /// Credits `handle` with a confirmed win worth `points`.
    fn record_win(&self, handle: &Handle, points: u32);

    /// Current totals for one handle.
    fn get(&self, handle: &Handle) -> Option<PlayerStats>;

    /// The top `limit` players: highest score first, then most wins,
    /// then handle alphabetically.
    fn leaderboard(&self, limit: usize) -> Vec<PlayerStats>;
}

/// A [`StatsStore`] that keeps everything in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    rows: Mutex<HashMap<Handle, PlayerStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every update is a few integer adds, so a poisoned map is still consistent.
    fn rows(&self) -> MutexGuard<'_, HashMap<Handle, PlayerStats>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, handle: &Handle, apply: impl FnOnce(&mut PlayerStats)) {
        let now = Utc::now();
        let mut rows = self.rows();
        let row = rows.entry(handle.clone()).or_insert_with(|| PlayerStats {
            handle: handle.clone(),
            total_score: 0,
            total_bingos: 0,
            games_played: 0,
            created_at: now,
            updated_at: now,
        });
        apply(row);
        row.updated_at = now;
    }
}

impl StatsStore for MemoryStatsStore {
    fn record_game_joined(&self, handle: &Handle) {
        self.update(handle, |row| row.games_played += 1);
    }

    fn record_win(&self, handle: &Handle, points: u32) {
        self.update(handle, |row| {
            row.total_score += u64::from(points);
            row.total_bingos += 1;
        });
        tracing::debug!(%handle, points, "win recorded");
    }

    fn get(&self, handle: &Handle) -> Option<PlayerStats> {
        self.rows().get(handle).cloned()
    }

    fn leaderboard(&self, limit: usize) -> Vec<PlayerStats> {
        let mut rows: Vec<PlayerStats> = self.rows().values().cloned().collect();
        rows.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(b.total_bingos.cmp(&a.total_bingos))
                .then_with(|| a.handle.cmp(&b.handle))
        });
        rows.truncate(limit);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(name: &str) -> Handle {
        Handle::new(name).unwrap()
    }

    #[test]
    fn test_rows_are_created_lazily() {
        let store = MemoryStatsStore::new();
        assert!(store.get(&h("alice")).is_none());

        store.record_game_joined(&h("alice"));
        let row = store.get(&h("alice")).unwrap();
        assert_eq!(row.games_played, 1);
        assert_eq!(row.total_score, 0);
        assert!(row.updated_at >= row.created_at);
    }

    #[test]
    fn test_win_adds_points_and_bingo() {
        let store = MemoryStatsStore::new();
        store.record_game_joined(&h("bob"));
        store.record_win(&h("bob"), 100);
        store.record_win(&h("bob"), 100);

        let row = store.get(&h("bob")).unwrap();
        assert_eq!(row.total_score, 200);
        assert_eq!(row.total_bingos, 2);
        assert_eq!(row.games_played, 1);
    }

    #[test]
    fn test_leaderboard_orders_and_truncates() {
        let store = MemoryStatsStore::new();
        for name in ["carol", "alice", "bob", "dave"] {
            store.record_game_joined(&h(name));
        }
        store.record_win(&h("bob"), 100);
        store.record_win(&h("carol"), 100);
        store.record_win(&h("carol"), 100);

        let board = store.leaderboard(3);
        let names: Vec<&str> = board.iter().map(|r| r.handle.as_str()).collect();
        assert_eq!(names, ["carol", "bob", "alice"]);
    }
}
