//! Common test utilities

use async_trait::async_trait;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiercache::{CacheError, LocalStore, MemoryStore, Result, Store, TieredCache};

/// Remote tier that refuses every call, counting attempts
#[allow(dead_code)] // Used by other test modules
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

#[allow(dead_code)] // Used by other test modules
impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Connection("connection refused".to_string())
    }
}

#[async_trait]
impl<K, V> Store<K, V> for FailingStore
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    async fn read(&self, _key: &K) -> Result<Option<V>> {
        Err(self.fail())
    }

    async fn write(&self, _key: K, _value: V) -> Result<()> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &K) -> Result<()> {
        Err(self.fail())
    }

    async fn clear(&self) -> Result<()> {
        Err(self.fail())
    }
}

/// Remote tier that answers like `MemoryStore`, after a delay
#[allow(dead_code)] // Used by other test modules
pub struct SlowStore<K, V> {
    pub inner: MemoryStore<K, V>,
    pub delay: Duration,
}

#[allow(dead_code)] // Used by other test modules
impl<K: Hash + Eq, V> SlowStore<K, V> {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for SlowStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &K) -> Result<Option<V>> {
        tokio::time::sleep(self.delay).await;
        self.inner.read(key).await
    }

    async fn write(&self, key: K, value: V) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &K) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(key).await
    }

    async fn clear(&self) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.clear().await
    }
}

pub type Local = Arc<LocalStore<String, String>>;
pub type Remote = Arc<MemoryStore<String, String>>;

/// Empty local tier (capacity 16) and empty in-memory remote tier
#[allow(dead_code)] // Used by other test modules
pub fn create_tiers() -> (Local, Remote) {
    (
        Arc::new(LocalStore::with_capacity(16)),
        Arc::new(MemoryStore::new()),
    )
}

/// Tiered cache over fresh tiers, returning the tiers for inspection
#[allow(dead_code)] // Used by other test modules
pub fn create_test_cache() -> (TieredCache<String, String>, Local, Remote) {
    let (local, remote) = create_tiers();
    let cache = TieredCache::new(local.clone(), remote.clone()).expect("runtime available");
    (cache, local, remote)
}

#[allow(dead_code)] // Used by other test modules
pub fn key(s: &str) -> String {
    s.to_string()
}

/// Poll `condition` until it holds or a second passes
#[allow(dead_code)] // Used by other test modules
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
