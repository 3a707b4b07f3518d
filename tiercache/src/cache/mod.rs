//! Cache Module
//!
//! Local caching layer:
//! - Bounded: in-memory cache capped by entry count, LRU eviction
//! - Recency: O(1) ordering structure backing the eviction policy

pub mod bounded;
pub mod recency;

pub use bounded::{BoundedCache, CacheStats, DEFAULT_MAX_ENTRIES};
pub use recency::{NodeId, RecencyList};
