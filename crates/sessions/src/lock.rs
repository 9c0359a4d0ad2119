//! Per-session turn exclusion.
//!
//! Each session id maps to a `Semaphore(1)`. Acquisition never waits: a
//! second caller while a turn is in flight gets `SessionBusy`. The permit
//! releases on drop, so a cancelled turn frees the session too.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use ca_domain::error::{Error, Result};

#[derive(Default)]
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };
        sem.try_acquire_owned().map_err(|_| Error::SessionBusy)
    }

    /// Drop the lock entry of a destroyed session. A permit still held
    /// keeps its semaphore alive until released.
    pub fn forget(&self, session_id: &str) {
        self.locks.lock().remove(session_id);
    }

    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }
}
