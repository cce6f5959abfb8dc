//! Per-brand engine state and the advisory locks that serialize it.
//!
//! Brands are independent units of mutation; the store hands out one lock
//! per brand so the alert read-modify-write and the baseline push-evict
//! stay single-writer even when evaluation cycles overlap (a slow cycle
//! still running when the next interval fires, or a manual re-run racing
//! the scheduled one).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Mutable per-brand state carried across cycles.
#[derive(Debug, Default)]
pub struct BrandState {
    /// Consecutive below-threshold cycles observed while an alert is
    /// active. Resets on every above-threshold verdict. In-memory only: a
    /// restart resets it, which merely delays resolution.
    pub quiet_streak: u32,
}

/// Registry of per-brand state, each entry behind its own async mutex.
#[derive(Debug, Default)]
pub struct BrandStateStore {
    inner: Mutex<HashMap<String, Arc<Mutex<BrandState>>>>,
}

impl BrandStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the advisory lock for one brand, creating its state entry
    /// on first sight. The guard owns the lock for the duration of that
    /// brand's cycle work; a concurrent cycle for the same brand waits
    /// here rather than interleaving.
    pub async fn lock_brand(&self, brand: &str) -> OwnedMutexGuard<BrandState> {
        let entry = {
            let mut map = self.inner.lock().await;
            Arc::clone(
                map.entry(brand.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(BrandState::default()))),
            )
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_persists_across_lock_acquisitions() {
        let store = BrandStateStore::new();
        {
            let mut state = store.lock_brand("acme").await;
            state.quiet_streak = 2;
        }
        let state = store.lock_brand("acme").await;
        assert_eq!(state.quiet_streak, 2);
    }

    #[tokio::test]
    async fn brands_lock_independently() {
        let store = BrandStateStore::new();
        let a = store.lock_brand("acme").await;
        // Holding acme's lock must not block globex.
        let b = store.lock_brand("globex").await;
        assert_eq!(a.quiet_streak, 0);
        assert_eq!(b.quiet_streak, 0);
    }

    #[tokio::test]
    async fn same_brand_lock_is_exclusive() {
        let store = Arc::new(BrandStateStore::new());
        let guard = store.lock_brand("acme").await;

        let store2 = Arc::clone(&store);
        let contender = tokio::spawn(async move {
            let mut state = store2.lock_brand("acme").await;
            state.quiet_streak += 1;
        });

        // The contender cannot finish while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.expect("contender completes");
        assert_eq!(store.lock_brand("acme").await.quiet_streak, 1);
    }
}
