//! # tiercache
//!
//! Two-tier cache: a bounded, LRU-evicting local tier in front of a
//! fallback remote tier, behind one read/write/delete/clear contract.
//!
//! ```text
//!            read ──► local tier (BoundedCache) ── hit ──► value
//!                          │ miss
//!                          ▼
//!                     remote tier ──► value | miss | error
//!
//!   write/delete/clear ──┬──► task: local tier
//!                        └──► task: remote tier      (returns Propagation)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiercache::{LocalStore, MemoryStore, TieredCache};
//!
//! # async fn example() -> tiercache::Result<()> {
//! let local: Arc<LocalStore<String, String>> = Arc::new(LocalStore::with_capacity(1_000));
//! let remote: Arc<MemoryStore<String, String>> = Arc::new(MemoryStore::new());
//! let cache = TieredCache::new(local, remote)?;
//!
//! // Fire-and-forget: the handle can be dropped...
//! cache.write("user:1".to_string(), "alice".to_string());
//! // ...or awaited for both tiers' results
//! cache.write("user:2".to_string(), "bob".to_string()).await?;
//!
//! assert_eq!(cache.read(&"user:2".to_string()).await?, Some("bob".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the bounded LRU cache and its recency list
//! - [`store`]: the [`Store`] tier contract and its implementations
//! - [`tiered`]: the [`TieredCache`] orchestrator and propagation handles
//! - [`config`]: YAML configuration and capacity sizing
//! - [`logging`]: `tracing` subscriber setup

pub mod cache;
pub mod config;
pub mod core;
pub mod logging;
pub mod store;
pub mod tiered;

// Re-export commonly used types
pub use cache::{BoundedCache, CacheStats};
pub use config::{CapacityConfig, LocalTierConfig, LoggingConfig, RedisTierConfig, TieredCacheConfig};
pub use crate::core::{CacheError, Operation, PropagationMode, Result, Tier};
pub use logging::init_tracing;
#[cfg(feature = "redis")]
pub use store::RedisStore;
pub use store::{LocalStore, MemoryStore, Store};
pub use tiered::{
    Propagation, PropagationFailure, PropagationOutcome, TieredCache, TieredCacheBuilder,
};
