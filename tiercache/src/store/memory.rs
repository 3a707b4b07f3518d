use ahash::RandomState;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

use super::Store;
use crate::core::Result;

/// Unbounded in-process tier
///
/// Handy as a remote stand-in for tests and single-process deployments.
pub struct MemoryStore<K, V> {
    data: RwLock<HashMap<K, V, RandomState>>,
}

impl<K: Hash + Eq, V> MemoryStore<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::default()),
        }
    }

    /// Get current item count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }
}

impl<K: Hash + Eq, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for MemoryStore<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: RwLock::new(iter.into_iter().collect()),
        }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for MemoryStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &K) -> Result<Option<V>> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn write(&self, key: K, value: V) -> Result<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.data.write().clear();
        Ok(())
    }
}
