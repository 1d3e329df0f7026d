//! Per-key async locks whose entries disappear once nobody holds them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Serializes work on the same key.
#[derive(Debug, Default)]
pub struct KeyLocks {
    entries: Mutex<LockMap>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `key` is free and returns a guard holding it.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = Arc::clone(self.entries().entry(key.to_string()).or_default());
        let guard = Arc::clone(&mutex).lock_owned().await;

        KeyGuard {
            locks: self,
            key: key.to_string(),
            mutex,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, LockMap> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds one key; releases it and prunes the entry on drop.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    mutex: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut entries = self.locks.entries();
        // Map entry plus `self.mutex`: no other caller is holding or waiting.
        let unused = entries
            .get(&self.key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.mutex) && Arc::strong_count(entry) == 2);
        if unused {
            entries.remove(&self.key);
        }
    }
}
