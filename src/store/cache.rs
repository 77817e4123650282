//! Time-boxed snapshot cache in front of the tools file.
//!
//! Every [`invalidate`](SnapshotCache::invalidate) starts a new generation.
//! A table loaded under an older generation is never stored, so a read that
//! raced a save cannot outlive it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::models::tool::ToolRecord;

struct Entry {
    table: Arc<Vec<ToolRecord>>,
    loaded_at: Instant,
}

#[derive(Default)]
struct Slot {
    entry: Option<Entry>,
    generation: u64,
}

/// Holds at most one loaded table for `ttl`. A zero TTL disables caching.
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Slot>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// The cached table, unless it has expired.
    pub fn get(&self) -> Option<Arc<Vec<ToolRecord>>> {
        let mut slot = self.lock();
        if slot
            .entry
            .as_ref()
            .is_some_and(|entry| entry.loaded_at.elapsed() >= self.ttl)
        {
            slot.entry = None;
        }
        slot.entry.as_ref().map(|entry| Arc::clone(&entry.table))
    }

    /// Current generation. Read it before loading and hand it to [`put`](Self::put).
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Store `table` if no invalidation happened since `generation` was read.
    /// Returns whether the table was kept.
    pub fn put(&self, table: Arc<Vec<ToolRecord>>, generation: u64) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(Entry {
            table,
            loaded_at: Instant::now(),
        });
        true
    }

    /// Drop the cached table so the next read goes to disk.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
