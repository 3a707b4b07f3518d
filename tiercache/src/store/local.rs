use async_trait::async_trait;
use std::hash::Hash;
use std::sync::Arc;

use super::Store;
use crate::cache::BoundedCache;
use crate::config::LocalTierConfig;
use crate::core::Result;

/// Local tier backed by a [`BoundedCache`]
///
/// Writes, deletes and clears go straight to the cache. Reads leave the
/// eviction order alone, so only writes refresh recency, unless read
/// promotion is turned on with [`with_read_promotion`](Self::with_read_promotion).
pub struct LocalStore<K, V> {
    cache: Arc<BoundedCache<K, V>>,
    promote_on_read: bool,
}

impl<K: Hash + Eq + Clone, V: Clone> LocalStore<K, V> {
    pub fn new(cache: BoundedCache<K, V>) -> Self {
        Self::from_shared(Arc::new(cache))
    }

    /// Wrap a cache that is also used directly elsewhere
    pub fn from_shared(cache: Arc<BoundedCache<K, V>>) -> Self {
        Self {
            cache,
            promote_on_read: false,
        }
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self::new(BoundedCache::new(max_entries))
    }

    /// Build from config, resolving the capacity to an entry count
    pub fn from_config(config: &LocalTierConfig) -> Result<Self> {
        let max_entries = config.capacity.resolve()?;
        Ok(Self::with_capacity(max_entries).with_read_promotion(config.promote_on_read))
    }

    pub fn with_read_promotion(mut self, promote: bool) -> Self {
        self.promote_on_read = promote;
        self
    }

    pub fn promotes_on_read(&self) -> bool {
        self.promote_on_read
    }

    /// Underlying cache, for inspection and stats
    pub fn cache(&self) -> &Arc<BoundedCache<K, V>> {
        &self.cache
    }
}

#[async_trait]
impl<K, V> Store<K, V> for LocalStore<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &K) -> Result<Option<V>> {
        if self.promote_on_read {
            Ok(self.cache.get(key))
        } else {
            Ok(self.cache.peek(key))
        }
    }

    async fn write(&self, key: K, value: V) -> Result<()> {
        self.cache.put(key, value);
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<()> {
        self.cache.delete(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.clear();
        Ok(())
    }
}
