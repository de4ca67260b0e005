//! Run-scoped classification cache
//!
//! Each distinct key owns a once-cell. Concurrent lookups for the same
//! uncached key wait on that cell, so a key is resolved at most once per
//! cache instance. Nothing is ever evicted.

use super::ClassificationOutcome;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<String>>;

/// Result of [`ClassificationCache::get_or_resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Served from an earlier resolution
    Hit(String),
    /// Resolved by this call
    Resolved(ClassificationOutcome),
}

#[derive(Debug, Default)]
pub struct ClassificationCache {
    slots: Mutex<HashMap<String, Slot>>,
    hits: AtomicU64,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Peek at a resolved label without counting a hit
    pub fn peek(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Store a label unless the key is already resolved
    pub fn insert(&self, key: &str, label: impl Into<String>) {
        // an existing value wins
        let _ = self.slot(key).set(label.into());
    }

    /// Return the cached label for `key`, or run `resolve` exactly once
    /// across all concurrent callers and cache the outcome's label.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> CacheLookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClassificationOutcome>,
    {
        let cell = self.slot(key);
        if let Some(label) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return CacheLookup::Hit(label.clone());
        }

        let mut fresh: Option<ClassificationOutcome> = None;
        let fresh_slot = &mut fresh;
        let label = cell
            .get_or_init(move || async move {
                let outcome = resolve().await;
                let label = outcome.label().to_string();
                *fresh_slot = Some(outcome);
                label
            })
            .await
            .clone();

        match fresh {
            Some(outcome) => CacheLookup::Resolved(outcome),
            None => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Hit(label)
            }
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of resolved keys
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ResolutionSource;
    use std::sync::atomic::AtomicUsize;

    fn resolved(label: &str) -> ClassificationOutcome {
        ClassificationOutcome::Resolved {
            label: label.to_string(),
            source: ResolutionSource::Oracle,
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache = ClassificationCache::new();

        let first = cache.get_or_resolve("経理", || async { resolved("経理") }).await;
        assert_eq!(first, CacheLookup::Resolved(resolved("経理")));

        let calls = AtomicUsize::new(0);
        let second = cache
            .get_or_resolve("経理", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                resolved("営業事務")
            })
            .await;
        assert_eq!(second, CacheLookup::Hit("経理".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_resolve_once() {
        let cache = Arc::new(ClassificationCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_resolve("同じ求人", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        resolved("経理")
                    })
                    .await
            }));
        }

        for handle in handles {
            let lookup = handle.await.unwrap();
            match lookup {
                CacheLookup::Hit(label) => assert_eq!(label, "経理"),
                CacheLookup::Resolved(outcome) => assert_eq!(outcome.label(), "経理"),
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 7);
    }

    #[test]
    fn test_insert_keeps_first_value() {
        let cache = ClassificationCache::new();
        cache.insert("k", "first");
        cache.insert("k", "second");
        assert_eq!(cache.peek("k").as_deref(), Some("first"));
        assert_eq!(cache.peek("missing"), None);
    }
}
