//! Content item cache
//!
//! Memoizes mapped instances for one retrieval scope so repeated lookups of
//! the same node return the same object.
//!
//! # Architecture
//!
//! ```text
//! get_or_create(id)
//!        │
//!        ▼
//! DashMap<(NodeId, TypeId), SlotState> ──Ready──▶ hit, no lock taken
//!        │ miss
//!        ▼
//! ReentrantMutex<()> (one per scope)
//!        │
//!        ├─ Ready     ──▶ built by the previous holder
//!        ├─ Building  ──▶ CyclicReference (same thread re-entry)
//!        └─ absent    ──▶ Building ──ok──▶ Ready
//!                                  └─err──▶ absent
//! ```
//!
//! Built instances are read without locking. Construction runs under a
//! single scope-wide reentrant lock, so a build may map further nodes on the
//! same thread while other threads wait their turn. Two threads mapping
//! mutually referencing nodes therefore never hold locks the other needs.
//! Concurrent first access to one key builds once; the waiting callers find
//! the entry `Ready` and receive the winner's instance.
//!
//! A same-thread re-entry finds its own key `Building` and fails with
//! [`VaultError::CyclicReference`] instead of deadlocking.
//!
//! # Cycles and request order
//!
//! When node A refers to node B and B refers back to A, whichever node is
//! requested first is built completely. The other is built while the first
//! is still `Building`, so its reference back is skipped, and it is cached
//! that way for the rest of the scope. The mapped contents of a cyclic pair
//! therefore depend on which node the scope requested first.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use tracing::{debug, trace};
use vault_sdk::NodeId;

use crate::error::{VaultError, VaultResult};

type Instance = Arc<dyn Any + Send + Sync>;
type Key = (NodeId, TypeId);

#[derive(Clone)]
enum SlotState {
    Building,
    Ready(Instance),
}

/// Per-scope cache of mapped instances
///
/// Entries are keyed by node id and requested type: the same node mapped as
/// two different types yields two instances, each unique within the scope.
#[derive(Default)]
pub struct ItemCache {
    entries: DashMap<Key, SlotState>,
    build: ReentrantMutex<()>,
}

impl ItemCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached instance for `node_id`, or build and insert it
    ///
    /// `create` runs at most once per key while it succeeds. If it fails the
    /// entry is removed and the error is returned, so a later call retries.
    pub fn get_or_create<T, F>(&self, node_id: NodeId, create: F) -> VaultResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> VaultResult<T>,
    {
        let type_name = std::any::type_name::<T>();
        let key = (node_id, TypeId::of::<T>());

        if let Some(SlotState::Ready(instance)) = self.state(&key) {
            trace!("Item cache hit for node {} as {}", node_id, type_name);
            return downcast(&instance, node_id);
        }

        let _build = self.build.lock();

        match self.state(&key) {
            Some(SlotState::Ready(instance)) => return downcast(&instance, node_id),
            Some(SlotState::Building) => {
                return Err(VaultError::CyclicReference { type_name, node_id });
            }
            None => {}
        }

        self.entries.insert(key, SlotState::Building);

        match create() {
            Ok(instance) => {
                let instance = Arc::new(instance);
                self.entries
                    .insert(key, SlotState::Ready(instance.clone() as Instance));
                debug!("Cached node {} as {}", node_id, type_name);
                Ok(instance)
            }
            Err(e) => {
                self.entries.remove(&key);
                Err(e)
            }
        }
    }

    /// Get a cached instance without building one
    pub fn get<T: Send + Sync + 'static>(&self, node_id: NodeId) -> Option<Arc<T>> {
        match self.state(&(node_id, TypeId::of::<T>()))? {
            SlotState::Ready(instance) => downcast(&instance, node_id).ok(),
            SlotState::Building => None,
        }
    }

    /// Check if any type has been cached for `node_id`
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.entries.iter().any(|entry| entry.key().0 == node_id)
    }

    /// Number of keys built or in progress
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached instance (scope teardown)
    pub fn clear(&self) {
        self.entries.clear();
        debug!("Item cache cleared");
    }

    // Cloned out so no shard lock is held while building
    fn state(&self, key: &Key) -> Option<SlotState> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

fn downcast<T: Send + Sync + 'static>(instance: &Instance, node_id: NodeId) -> VaultResult<Arc<T>> {
    Arc::clone(instance)
        .downcast::<T>()
        .map_err(|_| VaultError::CacheTypeMismatch {
            type_name: std::any::type_name::<T>(),
            node_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[derive(Debug)]
    struct Page {
        id: NodeId,
    }

    #[test]
    fn test_same_id_returns_same_instance() {
        let cache = ItemCache::new();

        let first = cache.get_or_create(1050, || Ok(Page { id: 1050 })).unwrap();
        let second = cache
            .get_or_create::<Page, _>(1050, || panic!("must not rebuild"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.id, 1050);
    }

    #[test]
    fn test_different_ids_return_distinct_instances() {
        let cache = ItemCache::new();

        let a = cache.get_or_create(1, || Ok(Page { id: 1 })).unwrap();
        let b = cache.get_or_create(2, || Ok(Page { id: 2 })).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_same_id_different_type_is_separate() {
        struct Other;

        let cache = ItemCache::new();
        cache.get_or_create(7, || Ok(Page { id: 7 })).unwrap();
        cache.get_or_create(7, || Ok(Other)).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get::<Page>(7).is_some());
        assert!(cache.get::<Other>(7).is_some());
    }

    #[test]
    fn test_failed_create_is_retried() {
        let cache = ItemCache::new();

        let err = cache.get_or_create::<Page, _>(3, || {
            Err(VaultError::NoConstructor {
                type_name: "Page",
                node_id: 3,
            })
        });
        assert!(matches!(err, Err(VaultError::NoConstructor { .. })));
        assert!(cache.get::<Page>(3).is_none());

        let page = cache.get_or_create(3, || Ok(Page { id: 3 })).unwrap();
        assert_eq!(page.id, 3);
    }

    #[test]
    fn test_reentrant_create_reports_cycle() {
        let cache = ItemCache::new();

        let result = cache.get_or_create(9, || {
            let inner = cache.get_or_create(9, || Ok(Page { id: 9 }));
            assert!(matches!(
                inner,
                Err(VaultError::CyclicReference { node_id: 9, .. })
            ));
            Ok(Page { id: 9 })
        });

        assert!(result.is_ok());
    }

    #[test]
    fn test_nested_create_for_other_id() {
        let cache = ItemCache::new();

        let outer = cache
            .get_or_create(10, || {
                let inner = cache.get_or_create(11, || Ok(Page { id: 11 }))?;
                Ok(Page { id: inner.id - 1 })
            })
            .unwrap();

        assert_eq!(outer.id, 10);
        assert!(cache.get::<Page>(11).is_some());
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        const THREADS: usize = 8;

        let cache = Arc::new(ItemCache::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let builds = Arc::clone(&builds);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_create(42, || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(10));
                            Ok(Page { id: 42 })
                        })
                        .unwrap()
                })
            })
            .collect();

        let pages: Vec<Arc<Page>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(pages.iter().all(|p| Arc::ptr_eq(p, &pages[0])));
    }

    #[test]
    fn test_concurrent_mutual_references_complete() {
        let cache = Arc::new(ItemCache::new());
        let barrier = Arc::new(Barrier::new(2));
        let (tx, rx) = mpsc::channel();

        // Each build maps the other node, so both threads need both keys
        for (id, other) in [(1, 2), (2, 1)] {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            thread::spawn(move || {
                barrier.wait();
                let page = cache.get_or_create(id, || {
                    thread::sleep(Duration::from_millis(50));
                    let _ = cache.get_or_create(other, || {
                        thread::sleep(Duration::from_millis(50));
                        let _ = cache.get_or_create::<Page, _>(id, || Ok(Page { id }));
                        Ok(Page { id: other })
                    });
                    Ok(Page { id })
                });
                let _ = tx.send(page.map(|p| p.id));
            });
        }
        drop(tx);

        for _ in 0..2 {
            let result = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("lookups of mutually referencing nodes must not block");
            assert!(result.is_ok());
        }

        let one = cache.get::<Page>(1).unwrap();
        let two = cache.get::<Page>(2).unwrap();
        assert_eq!((one.id, two.id), (1, 2));
    }

    #[test]
    fn test_clear_drops_entries() {
        let cache = ItemCache::new();
        cache.get_or_create(5, || Ok(Page { id: 5 })).unwrap();
        assert!(cache.contains(5));

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(5));
    }
}
