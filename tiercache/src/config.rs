use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::core::{CacheError, PropagationMode, Result};

/// Lower bound for memory-derived capacity: 20% of system memory
pub const MIN_MEMORY_FRACTION: f32 = 0.20;
/// Upper bound for memory-derived capacity: 50% of system memory
pub const MAX_MEMORY_FRACTION: f32 = 0.50;

/// Main tiered cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TieredCacheConfig {
    pub local: LocalTierConfig,
    pub propagation: PropagationMode,
    pub write_back_on_remote_hit: bool,
    pub redis: Option<RedisTierConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalTierConfig {
    pub capacity: CapacityConfig,
    pub promote_on_read: bool,
}

impl Default for LocalTierConfig {
    fn default() -> Self {
        Self {
            capacity: CapacityConfig::default(),
            promote_on_read: false,
        }
    }
}

/// How the local tier's maximum entry count is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CapacityConfig {
    /// Fixed number of entries
    Entries { max_entries: usize },
    /// Fraction of system memory divided by an estimated entry size.
    /// The fraction is clamped to `[0.20, 0.50]`.
    MemoryFraction { fraction: f32, avg_entry_bytes: usize },
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self::Entries {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CapacityConfig {
    /// Resolve to an entry count, reading total memory when needed
    pub fn resolve(&self) -> Result<usize> {
        match self {
            Self::Entries { max_entries } => Ok(*max_entries),
            Self::MemoryFraction { .. } => {
                let mem = sys_info::mem_info().map_err(|e| {
                    CacheError::InvalidConfig(format!("cannot read system memory: {}", e))
                })?;
                self.resolve_with_total_memory(mem.total * 1024)
            }
        }
    }

    /// Resolve to an entry count given total memory in bytes
    pub fn resolve_with_total_memory(&self, total_bytes: u64) -> Result<usize> {
        match *self {
            Self::Entries { max_entries } => Ok(max_entries),
            Self::MemoryFraction {
                fraction,
                avg_entry_bytes,
            } => {
                if avg_entry_bytes == 0 {
                    return Err(CacheError::InvalidConfig(
                        "avg_entry_bytes must be greater than 0".to_string(),
                    ));
                }
                if !fraction.is_finite() {
                    return Err(CacheError::InvalidConfig(format!(
                        "memory fraction must be a number, got {}",
                        fraction
                    )));
                }

                let fraction = fraction.clamp(MIN_MEMORY_FRACTION, MAX_MEMORY_FRACTION);
                let budget = total_bytes as f64 * f64::from(fraction);
                Ok((budget / avg_entry_bytes as f64) as usize)
            }
        }
    }
}

/// Connection settings for the Redis remote tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisTierConfig {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub database: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: u64,
    pub key_prefix: String,
}

impl Default for RedisTierConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            use_tls: false,
            database: 0,
            username: None,
            password: None,
            timeout_ms: 2000,
            key_prefix: String::new(),
        }
    }
}

impl RedisTierConfig {
    /// Connection URL: `redis[s]://[user[:pass]@]host:port/db`
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "rediss" } else { "redis" };
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", user, pass),
            (None, Some(pass)) => format!(":{}@", pass),
            (Some(user), None) => format!("{}@", user),
            (None, None) => String::new(),
        };
        format!(
            "{}://{}{}:{}/{}",
            scheme, auth, self.host, self.port, self.database
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json`, `pretty` or `text`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl TieredCacheConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        Ok(config)
    }

    /// Parse and validate YAML configuration
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: TieredCacheConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let CapacityConfig::MemoryFraction {
            fraction,
            avg_entry_bytes,
        } = self.local.capacity
        {
            if avg_entry_bytes == 0 {
                return Err(CacheError::InvalidConfig(
                    "local.capacity.avg_entry_bytes must be greater than 0".to_string(),
                ));
            }
            // Finite values outside [0.20, 0.50] are clamped on resolve
            if !fraction.is_finite() {
                return Err(CacheError::InvalidConfig(format!(
                    "local.capacity.fraction must be a number, got {}",
                    fraction
                )));
            }
        }

        if let Some(redis) = &self.redis {
            if redis.host.is_empty() {
                return Err(CacheError::InvalidConfig(
                    "redis.host must not be empty".to_string(),
                ));
            }
            if redis.timeout_ms == 0 {
                return Err(CacheError::InvalidConfig(
                    "redis.timeout_ms must be greater than 0".to_string(),
                ));
            }
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "text" => Ok(()),
            other => Err(CacheError::InvalidConfig(format!(
                "logging.format must be json, pretty or text, got {}",
                other
            ))),
        }
    }
}
