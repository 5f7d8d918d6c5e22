//! Request coalescing with a result cache
//!
//! [`RequestCoalescer`] guarantees at most one outstanding fetch per key.
//! Concurrent callers for the same key share the in-flight result, and
//! successful results are cached for the lifetime of the coalescer.
//!
//! The in-flight map and the cache live under one mutex, so a key is never
//! observed as both in flight and resolved. A fetch that fails, is
//! cancelled, or panics leaves no trace in either.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

type SharedFetch<V> = Shared<BoxFuture<'static, Option<V>>>;

struct Registry<K, V> {
    resolved: HashMap<K, V>,
    pending: HashMap<K, SharedFetch<V>>,
}

/// Deduplicates concurrent fetches per key and caches successes
pub struct RequestCoalescer<K, V> {
    registry: Arc<Mutex<Registry<K, V>>>,
}

impl<K, V> Clone for RequestCoalescer<K, V> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<K, V> Default for RequestCoalescer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the in-flight entry when the fetch task ends, however it ends
struct PendingGuard<K: Eq + Hash, V> {
    registry: Arc<Mutex<Registry<K, V>>>,
    key: Option<K>,
}

impl<K: Eq + Hash, V> PendingGuard<K, V> {
    fn settle(mut self, value: Option<V>) {
        if let Some(key) = self.key.take() {
            let mut registry = lock(&self.registry);
            registry.pending.remove(&key);
            if let Some(value) = value {
                registry.resolved.insert(key, value);
            }
        }
    }
}

impl<K: Eq + Hash, V> Drop for PendingGuard<K, V> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(&self.registry).pending.remove(&key);
        }
    }
}

fn lock<K, V>(registry: &Mutex<Registry<K, V>>) -> MutexGuard<'_, Registry<K, V>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K, V> RequestCoalescer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty coalescer
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                resolved: HashMap::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Cached value for `key`
    pub fn get(&self, key: &K) -> Option<V> {
        lock(&self.registry).resolved.get(key).cloned()
    }

    /// Returns true while a fetch for `key` is in flight
    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.registry).pending.contains_key(key)
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        lock(&self.registry).resolved.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached value. In-flight fetches are left running.
    pub fn clear(&self) {
        lock(&self.registry).resolved.clear();
    }

    /// Resolve `key`, starting a fetch with `start` only if none is cached or in flight.
    ///
    /// The fetch runs as its own task. The token of the caller that starts it
    /// cancels the fetch for everyone; tokens of callers that join later only
    /// stop those callers from waiting. A `None` result is not cached.
    pub async fn fetch<F, Fut>(
        &self,
        key: K,
        cancel: Option<&CancellationToken>,
        start: F,
    ) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>> + Send + 'static,
    {
        let shared = {
            let mut registry = lock(&self.registry);
            if let Some(value) = registry.resolved.get(&key) {
                return Some(value.clone());
            }
            match registry.pending.get(&key) {
                Some(pending) => pending.clone(),
                None => {
                    let shared = self.spawn_fetch(key.clone(), cancel.cloned(), start());
                    registry.pending.insert(key, shared.clone());
                    shared
                }
            }
        };

        match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => None,
                value = shared => value,
            },
            None => shared.await,
        }
    }

    // Called with the registry locked; the task cannot settle before the
    // pending entry is inserted because settling takes the same lock.
    fn spawn_fetch<Fut>(
        &self,
        key: K,
        cancel: Option<CancellationToken>,
        fetch: Fut,
    ) -> SharedFetch<V>
    where
        Fut: Future<Output = Option<V>> + Send + 'static,
    {
        let guard = PendingGuard {
            registry: Arc::clone(&self.registry),
            key: Some(key),
        };
        let task = tokio::spawn(async move {
            let value = match cancel {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => None,
                    value = fetch => value,
                },
                None => fetch.await,
            };
            guard.settle(value.clone());
            value
        });
        async move { task.await.ok().flatten() }.boxed().shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let coalescer: RequestCoalescer<String, u32> = RequestCoalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let start = |calls: Arc<AtomicUsize>, gate: Arc<Notify>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Some(7)
            }
        };

        let first = {
            let coalescer = coalescer.clone();
            let start = start(Arc::clone(&calls), Arc::clone(&gate));
            tokio::spawn(async move { coalescer.fetch("react".to_string(), None, start).await })
        };
        wait_until(|| coalescer.is_pending(&"react".to_string())).await;

        let second = {
            let coalescer = coalescer.clone();
            let start = start(Arc::clone(&calls), Arc::clone(&gate));
            tokio::spawn(async move { coalescer.fetch("react".to_string(), None, start).await })
        };
        tokio::task::yield_now().await;
        gate.notify_one();

        assert_eq!(first.await.unwrap(), Some(7));
        assert_eq!(second.await.unwrap(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coalescer.get(&"react".to_string()), Some(7));
        assert!(!coalescer.is_pending(&"react".to_string()));
    }

    #[tokio::test]
    async fn test_cached_value_skips_fetch() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        assert_eq!(coalescer.fetch("a", None, || async { Some(1) }).await, Some(1));

        let calls = AtomicUsize::new(0);
        let value = coalescer
            .fetch("a", None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Some(2) }
            })
            .await;
        assert_eq!(value, Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_none_is_not_cached() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        assert_eq!(coalescer.fetch("a", None, || async { None }).await, None);
        assert!(coalescer.get(&"a").is_none());
        assert!(!coalescer.is_pending(&"a"));
        assert!(coalescer.is_empty());

        assert_eq!(coalescer.fetch("a", None, || async { Some(3) }).await, Some(3));
        assert_eq!(coalescer.len(), 1);
    }

    #[tokio::test]
    async fn test_initiator_cancellation_cancels_fetch() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        let token = CancellationToken::new();

        let handle = {
            let coalescer = coalescer.clone();
            let token = token.clone();
            tokio::spawn(async move {
                coalescer
                    .fetch("slow", Some(&token), || futures::future::pending::<Option<u32>>())
                    .await
            })
        };
        wait_until(|| coalescer.is_pending(&"slow")).await;

        token.cancel();
        assert_eq!(handle.await.unwrap(), None);
        wait_until(|| !coalescer.is_pending(&"slow")).await;
        assert!(coalescer.get(&"slow").is_none());
    }

    #[tokio::test]
    async fn test_later_caller_cancellation_only_detaches() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        let gate = Arc::new(Notify::new());

        let first = {
            let coalescer = coalescer.clone();
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                coalescer
                    .fetch("pkg", None, move || async move {
                        gate.notified().await;
                        Some(42)
                    })
                    .await
            })
        };
        wait_until(|| coalescer.is_pending(&"pkg")).await;

        let token = CancellationToken::new();
        let second = {
            let coalescer = coalescer.clone();
            let token = token.clone();
            tokio::spawn(async move {
                coalescer
                    .fetch("pkg", Some(&token), || async { Some(0) })
                    .await
            })
        };
        tokio::task::yield_now().await;
        token.cancel();
        assert_eq!(second.await.unwrap(), None);
        assert!(coalescer.is_pending(&"pkg"));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Some(42));
        assert_eq!(coalescer.get(&"pkg"), Some(42));
    }

    #[tokio::test]
    async fn test_panicking_fetch_leaves_no_trace() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        let value = coalescer
            .fetch("bad", None, || async {
                None::<u32>.or_else(|| panic!("registry exploded"))
            })
            .await;
        assert_eq!(value, None);
        assert!(!coalescer.is_pending(&"bad"));
        assert!(coalescer.get(&"bad").is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let coalescer: RequestCoalescer<&'static str, u32> = RequestCoalescer::new();
        coalescer.fetch("a", None, || async { Some(1) }).await;
        coalescer.clear();
        assert!(coalescer.get(&"a").is_none());
    }
}
