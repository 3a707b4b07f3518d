//! Tiered cache
//!
//! One logical cache over a fast, bounded local tier and a slower remote
//! tier:
//! - reads try local, then remote, and return what the remote reports
//! - writes, deletes and clears fan out to both tiers as independent tasks
//!   and return immediately with a [`Propagation`] handle
//!
//! The two tasks of one mutation are not ordered relative to each other,
//! and neither are back-to-back mutations of the same key. Callers that
//! need ordering per key must await the handle before issuing the next one.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TieredCacheConfig;
use crate::core::{CacheError, Operation, PropagationMode, Result, Tier};
use crate::store::Store;

pub mod propagation;

pub use propagation::{FailureHook, Propagation, PropagationFailure, PropagationOutcome};

/// Local tier in front of a remote tier
pub struct TieredCache<K, V> {
    local: Arc<dyn Store<K, V>>,
    remote: Arc<dyn Store<K, V>>,
    runtime: Handle,
    mode: PropagationMode,
    write_back: bool,
    on_failure: Option<FailureHook>,
}

/// Builder for [`TieredCache`]
pub struct TieredCacheBuilder<K, V> {
    local: Arc<dyn Store<K, V>>,
    remote: Arc<dyn Store<K, V>>,
    runtime: Option<Handle>,
    mode: PropagationMode,
    write_back: bool,
    on_failure: Option<FailureHook>,
}

impl<K, V> TieredCacheBuilder<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Populate the local tier when a read misses locally but hits remote
    pub fn write_back_on_remote_hit(mut self, enabled: bool) -> Self {
        self.write_back = enabled;
        self
    }

    /// Completion behaviour of mutations made through the `Store` trait
    pub fn propagation_mode(mut self, mode: PropagationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Runtime that propagation tasks are spawned on.
    /// Defaults to the runtime `build` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Called from the background task whenever a tier fails a mutation
    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PropagationFailure<'_>) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    /// Apply propagation and write-back settings from config
    pub fn with_config(self, config: &TieredCacheConfig) -> Self {
        self.propagation_mode(config.propagation)
            .write_back_on_remote_hit(config.write_back_on_remote_hit)
    }

    pub fn build(self) -> Result<TieredCache<K, V>> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| CacheError::NoRuntime)?,
        };

        info!(
            "Initializing tiered cache (propagation={:?}, write_back={})",
            self.mode, self.write_back
        );

        Ok(TieredCache {
            local: self.local,
            remote: self.remote,
            runtime,
            mode: self.mode,
            write_back: self.write_back,
            on_failure: self.on_failure,
        })
    }
}

impl<K, V> TieredCache<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Compose two tiers with default settings, on the current runtime
    pub fn new(local: Arc<dyn Store<K, V>>, remote: Arc<dyn Store<K, V>>) -> Result<Self> {
        Self::builder(local, remote).build()
    }

    pub fn builder(
        local: Arc<dyn Store<K, V>>,
        remote: Arc<dyn Store<K, V>>,
    ) -> TieredCacheBuilder<K, V> {
        TieredCacheBuilder {
            local,
            remote,
            runtime: None,
            mode: PropagationMode::default(),
            write_back: false,
            on_failure: None,
        }
    }

    pub fn local(&self) -> &Arc<dyn Store<K, V>> {
        &self.local
    }

    pub fn remote(&self) -> &Arc<dyn Store<K, V>> {
        &self.remote
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.mode
    }

    pub fn writes_back(&self) -> bool {
        self.write_back
    }

    /// Local tier first; on a local miss, whatever the remote tier reports.
    ///
    /// A local hit never touches the remote tier. Remote failures are
    /// returned to the caller, never turned into a miss.
    pub async fn read(&self, key: &K) -> Result<Option<V>> {
        if let Some(value) = self.local.read(key).await? {
            debug!("Tiered read: local HIT");
            return Ok(Some(value));
        }

        let remote = self.remote.read(key).await?;
        debug!("Tiered read: local MISS, remote hit={}", remote.is_some());

        if self.write_back {
            if let Some(value) = &remote {
                self.local.write(key.clone(), value.clone()).await?;
            }
        }

        Ok(remote)
    }

    /// Write to both tiers in the background
    pub fn write(&self, key: K, value: V) -> Propagation {
        let remote = {
            let store = Arc::clone(&self.remote);
            let (key, value) = (key.clone(), value.clone());
            self.spawn(Tier::Remote, Operation::Write, async move {
                store.write(key, value).await
            })
        };
        let local = {
            let store = Arc::clone(&self.local);
            self.spawn(Tier::Local, Operation::Write, async move {
                store.write(key, value).await
            })
        };

        Propagation::new(Operation::Write, local, remote)
    }

    /// Delete from both tiers in the background
    pub fn delete(&self, key: &K) -> Propagation {
        let remote = {
            let store = Arc::clone(&self.remote);
            let key = key.clone();
            self.spawn(Tier::Remote, Operation::Delete, async move {
                store.delete(&key).await
            })
        };
        let local = {
            let store = Arc::clone(&self.local);
            let key = key.clone();
            self.spawn(Tier::Local, Operation::Delete, async move {
                store.delete(&key).await
            })
        };

        Propagation::new(Operation::Delete, local, remote)
    }

    /// Clear both tiers in the background
    pub fn clear(&self) -> Propagation {
        let remote = {
            let store = Arc::clone(&self.remote);
            self.spawn(Tier::Remote, Operation::Clear, async move {
                store.clear().await
            })
        };
        let local = {
            let store = Arc::clone(&self.local);
            self.spawn(Tier::Local, Operation::Clear, async move {
                store.clear().await
            })
        };

        Propagation::new(Operation::Clear, local, remote)
    }

    /// Write to both tiers and wait for both
    pub async fn write_and_wait(&self, key: K, value: V) -> Result<()> {
        self.write(key, value).wait().await
    }

    /// Delete from both tiers and wait for both
    pub async fn delete_and_wait(&self, key: &K) -> Result<()> {
        self.delete(key).wait().await
    }

    /// Clear both tiers and wait for both
    pub async fn clear_and_wait(&self) -> Result<()> {
        self.clear().wait().await
    }

    fn spawn<F>(&self, tier: Tier, operation: Operation, task: F) -> JoinHandle<Result<()>>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let on_failure = self.on_failure.clone();

        self.runtime.spawn(async move {
            let result = task.await;
            if let Err(error) = &result {
                warn!(%tier, %operation, %error, "Tier propagation failed");
                if let Some(hook) = &on_failure {
                    hook(&PropagationFailure {
                        tier,
                        operation,
                        error,
                    });
                }
            }
            result
        })
    }

    async fn settle(&self, propagation: Propagation) -> Result<()> {
        match self.mode {
            PropagationMode::Detached => {
                propagation.detach();
                Ok(())
            }
            PropagationMode::AwaitBoth => propagation.wait().await,
        }
    }
}

impl<K, V> Clone for TieredCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
            runtime: self.runtime.clone(),
            mode: self.mode,
            write_back: self.write_back,
            on_failure: self.on_failure.clone(),
        }
    }
}

/// A `TieredCache` can stand in wherever a single tier is expected, even as
/// a tier of another `TieredCache`. Mutations complete according to the
/// configured [`PropagationMode`].
#[async_trait]
impl<K, V> Store<K, V> for TieredCache<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn read(&self, key: &K) -> Result<Option<V>> {
        TieredCache::read(self, key).await
    }

    async fn write(&self, key: K, value: V) -> Result<()> {
        let propagation = TieredCache::write(self, key, value);
        self.settle(propagation).await
    }

    async fn delete(&self, key: &K) -> Result<()> {
        let propagation = TieredCache::delete(self, key);
        self.settle(propagation).await
    }

    async fn clear(&self) -> Result<()> {
        let propagation = TieredCache::clear(self);
        self.settle(propagation).await
    }
}
