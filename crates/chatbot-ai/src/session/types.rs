//! Turn state and per-thread turn locks.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, Weak};

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Where a thread is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    Idle,
    Invoking,
}

/// One fair async mutex per thread id. Entries are weak so a thread with no
/// turn in flight or queued costs nothing.
#[derive(Default)]
pub(crate) struct ThreadLocks {
    locks: std::sync::Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

/// Held for the duration of a turn. Dropping it lets the next queued turn on
/// the same thread proceed.
pub(crate) struct TurnGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ThreadLocks {
    fn handle(&self, thread_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(thread_id).and_then(Weak::upgrade) {
            return lock;
        }

        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(thread_id.to_string(), Arc::downgrade(&lock));
        lock
    }

    /// Wait for the thread's turn.
    pub(crate) async fn acquire(&self, thread_id: &str) -> TurnGuard {
        let lock = self.handle(thread_id);
        TurnGuard {
            _guard: lock.lock_owned().await,
        }
    }

    pub(crate) fn state(&self, thread_id: &str) -> TurnState {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.get(thread_id).and_then(Weak::upgrade) {
            Some(lock) if lock.try_lock().is_err() => TurnState::Invoking,
            _ => TurnState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_follows_guard() {
        let locks = ThreadLocks::default();
        assert_eq!(locks.state("t"), TurnState::Idle);

        let guard = locks.acquire("t").await;
        assert_eq!(locks.state("t"), TurnState::Invoking);
        assert_eq!(locks.state("other"), TurnState::Idle);

        drop(guard);
        assert_eq!(locks.state("t"), TurnState::Idle);
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = ThreadLocks::default();
        drop(locks.acquire("a").await);
        let _b = locks.acquire("b").await;

        let map = locks.locks.lock().unwrap();
        assert!(!map.contains_key("a"));
        assert!(map.contains_key("b"));
    }

    #[tokio::test]
    async fn second_turn_waits_for_first() {
        let locks = Arc::new(ThreadLocks::default());
        let first = locks.acquire("t").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _second = locks.acquire("t").await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TurnState::Invoking).unwrap(),
            "\"invoking\""
        );
    }
}
