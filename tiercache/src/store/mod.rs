//! Storage tiers
//!
//! Every tier, local or remote, implements [`Store`]. A lookup that finds
//! nothing is `Ok(None)`; an `Err` always means the tier itself failed.

use async_trait::async_trait;

use crate::core::Result;

pub mod local;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use local::LocalStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

/// Read/write/delete/clear contract shared by all tiers
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait Store<K, V>: Send + Sync {
    /// Value for `key`, or `None` if the tier does not hold it
    async fn read(&self, key: &K) -> Result<Option<V>>;

    /// Insert or overwrite `key`
    async fn write(&self, key: K, value: V) -> Result<()>;

    /// Remove `key`; absent keys are not an error
    async fn delete(&self, key: &K) -> Result<()>;

    /// Remove every entry the tier holds
    async fn clear(&self) -> Result<()>;
}
