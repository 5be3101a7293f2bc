use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use heic_core::ResultKey;

/// Owner of converted bytes between conversion and release.
pub trait ResultStore: Send + Sync {
    fn insert(&self, bytes: Bytes) -> ResultKey;
    /// Re-materializes the bytes behind a live key.
    fn get(&self, key: ResultKey) -> Option<Bytes>;
    /// Frees the bytes. Returns `false` if the key was not live.
    fn release(&self, key: ResultKey) -> bool;
    fn live_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct MemoryResultStore {
    inner: Mutex<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    next_id: u64,
    live: HashMap<u64, Bytes>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultStore for MemoryResultStore {
    fn insert(&self, bytes: Bytes) -> ResultKey {
        let mut slots = self.slots();
        slots.next_id += 1;
        let key = ResultKey {
            id: slots.next_id,
            byte_len: bytes.len() as u64,
        };
        slots.live.insert(key.id, bytes);
        key
    }

    fn get(&self, key: ResultKey) -> Option<Bytes> {
        self.slots().live.get(&key.id).cloned()
    }

    fn release(&self, key: ResultKey) -> bool {
        self.slots().live.remove(&key.id).is_some()
    }

    fn live_count(&self) -> usize {
        self.slots().live.len()
    }
}
