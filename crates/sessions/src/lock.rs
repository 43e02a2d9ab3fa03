//! Per-session mutual exclusion.
//!
//! At most one request may be composing an answer for a given session key
//! at a time.  Locks are single-permit semaphores handed out per key; a
//! second caller on the same key gets `SessionBusy` immediately instead of
//! queueing, so the transport layer can surface a "busy" response.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Returned when a session already has a request in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBusy {
    pub session_key: String,
}

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session `{}` has a request in flight", self.session_key)
    }
}

impl std::error::Error for SessionBusy {}

/// Map of session key to its single-permit lock.
#[derive(Default)]
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for a session key.
    ///
    /// The returned permit releases the lock on drop.  Fails fast with
    /// `SessionBusy` when the key is already held.
    pub fn try_acquire(&self, session_key: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_key.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        match sem.try_acquire_owned() {
            Ok(permit) => Ok(permit),
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => Err(SessionBusy {
                session_key: session_key.to_owned(),
            }),
        }
    }

    /// Drop lock entries that are not currently held.
    ///
    /// Keeps the map from growing unboundedly with one-shot session keys.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, sem| sem.available_permits() == 0);
        before - locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_on_same_key_is_busy() {
        let locks = SessionLockMap::new();
        let permit = locks.try_acquire("alpha").unwrap();
        let err = locks.try_acquire("alpha").unwrap_err();
        assert_eq!(err.session_key, "alpha");
        drop(permit);
        assert!(locks.try_acquire("alpha").is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = SessionLockMap::new();
        let _a = locks.try_acquire("alpha").unwrap();
        let _b = locks.try_acquire("beta").unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn prune_removes_only_released_locks() {
        let locks = SessionLockMap::new();
        let held = locks.try_acquire("held").unwrap();
        let released = locks.try_acquire("released").unwrap();
        drop(released);

        let pruned = locks.prune_idle();
        assert_eq!(pruned, 1);
        assert_eq!(locks.len(), 1);
        drop(held);
    }

    #[tokio::test]
    async fn one_shot_keys_do_not_accumulate_past_a_sweep() {
        let locks = SessionLockMap::new();

        // Anonymous clients each get a fresh key, used exactly once.
        for i in 0..1000 {
            let permit = locks.try_acquire(&format!("http:{i}")).unwrap();
            drop(permit);
        }
        assert_eq!(locks.len(), 1000);

        let _held = locks.try_acquire("ws:active").unwrap();
        let pruned = locks.prune_idle();
        assert_eq!(pruned, 1000);
        assert_eq!(locks.len(), 1);
    }
}
