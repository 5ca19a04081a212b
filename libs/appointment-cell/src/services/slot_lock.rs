use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::models::SlotKey;

/// One async mutex per doctor-slot. Holding the guard serialises the
/// conflict check and the write for that slot; other slots are untouched.
#[derive(Default)]
pub struct SlotLocks {
    slots: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
}

pub struct SlotGuard<'a> {
    locks: &'a SlotLocks,
    key: SlotKey,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: SlotKey) -> SlotGuard<'_> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        debug!("Waiting for slot lock {}", key);
        let guard = Arc::clone(&lock).lock_owned().await;

        SlotGuard {
            locks: self,
            key,
            lock,
            guard: Some(guard),
        }
    }

    /// Number of slots with a holder or waiter.
    pub fn active_slots(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut slots = self.locks.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // the map and this guard are the only owners left: nobody is waiting
        if Arc::strong_count(&self.lock) == 2 {
            slots.remove(&self.key);
        }
    }
}
