//! Per-activity advisory locks.
//!
//! Every mutating workflow operation holds the lock of the activity it
//! touches for its whole read-validate-write span. That closes the
//! allocation race: two concurrent assignments on the same activity
//! serialize, so the second one revalidates against the first one's row
//! and the allocation total can never pass 100%.
//!
//! Locks are keyed by [`ActivityId`] and created on first use. Distinct
//! activities never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use hmh_core::ActivityId;

/// Registry of per-activity async locks.
#[derive(Debug, Default)]
pub struct ActivityLocks {
    inner: Mutex<HashMap<ActivityId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ActivityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id`, waiting if another operation on the
    /// same activity holds it.
    pub async fn acquire(&self, id: ActivityId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
