//! Per-lease mutual exclusion

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use tfsecrets_core::LeaseId;

/// Table of async locks keyed by lease handle
///
/// Renew and revoke on one lease hold its lock across the whole
/// read-modify-write. Entries are dropped once no task holds or waits on them.
#[derive(Debug, Default)]
pub struct LeaseLocks {
    locks: Mutex<HashMap<LeaseId, Arc<AsyncMutex<()>>>>,
}

impl LeaseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `lease_id`
    pub async fn lock(&self, lease_id: LeaseId) -> LeaseGuard<'_> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(lease_id).or_default().clone()
        };
        let guard = mutex.lock_owned().await;

        LeaseGuard {
            locks: self,
            lease_id,
            guard: Some(guard),
        }
    }

    /// Number of leases with a live lock entry
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one lease; released on drop
pub struct LeaseGuard<'a> {
    locks: &'a LeaseLocks,
    lease_id: LeaseId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self
            .locks
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the table itself still references the mutex: nobody is waiting
        if locks
            .get(&self.lease_id)
            .is_some_and(|m| Arc::strong_count(m) == 1)
        {
            locks.remove(&self.lease_id);
        }
    }
}
