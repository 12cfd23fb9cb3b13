//! Named exclusive locks.
//!
//! A lock is identified by a resource name such as `issue@MyCoin.USD`. The
//! guard is owned by the transaction that took it and releases the lock when
//! dropped, on success and failure alike.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-name async mutexes.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Held lock. Dropping it releases the name.
#[derive(Debug)]
pub struct NamedLockGuard {
    name: String,
    _guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `name`.
    pub async fn acquire(&self, name: &str) -> NamedLockGuard {
        let mutex = self.mutex_for(name);
        let guard = mutex.lock_owned().await;
        tracing::trace!(lock = name, "named lock acquired");
        NamedLockGuard {
            name: name.to_string(),
            _guard: guard,
        }
    }

    /// Take `name` only if nobody holds it.
    pub fn try_acquire(&self, name: &str) -> Option<NamedLockGuard> {
        let mutex = self.mutex_for(name);
        let guard = mutex.try_lock_owned().ok()?;
        Some(NamedLockGuard {
            name: name.to_string(),
            _guard: guard,
        })
    }

    fn mutex_for(&self, name: &str) -> Arc<AsyncMutex<()>> {
        // The map lock is only held for the lookup; a poisoned map is still
        // structurally valid.
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

/// Lock name guarding issuance of `currency`.
pub fn issue_lock_name(currency: &str) -> String {
    format!("issue@{}", currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_name_is_exclusive() {
        let registry = LockRegistry::new();
        let guard = registry.acquire("issue@MyCoin.USD").await;
        assert_eq!(guard.name(), "issue@MyCoin.USD");
        assert!(registry.try_acquire("issue@MyCoin.USD").is_none());

        drop(guard);
        assert!(registry.try_acquire("issue@MyCoin.USD").is_some());
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let registry = LockRegistry::new();
        let _a = registry.acquire("issue@A.USD").await;
        assert!(registry.try_acquire("issue@B.USD").is_some());
    }

    #[tokio::test]
    async fn test_waiter_proceeds_after_release() {
        let registry = LockRegistry::new();
        let guard = registry.acquire("issue@X.EUR").await;

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move {
                let _guard = registry.acquire("issue@X.EUR").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }

    #[test]
    fn test_issue_lock_name() {
        assert_eq!(issue_lock_name("MyCoin.USD"), "issue@MyCoin.USD");
    }
}
