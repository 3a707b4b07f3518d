//! Redis remote tier
//!
//! Keys and values are stored as JSON strings (`SET key json`), optionally
//! under a key prefix so several caches can share one database. Every
//! round trip is bounded by the configured timeout; a stalled connection
//! surfaces as [`CacheError::Timeout`] instead of hanging the caller.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

use super::Store;
use crate::config::RedisTierConfig;
use crate::core::{CacheError, Operation, Result};

pub struct RedisStore<K, V> {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g., "myapp:" → "myapp:\"user.alice\"")
    prefix: String,
    timeout: Duration,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> RedisStore<K, V> {
    /// Connect using the given config
    pub async fn connect(config: &RedisTierConfig) -> Result<Self> {
        let client = Client::open(config.url())
            .map_err(|e| CacheError::InvalidConfig(format!("redis url: {}", e)))?;
        let timeout = config.timeout();

        info!(
            "Connecting Redis tier at {}:{} (db={}, tls={})",
            config.host, config.port, config.database, config.use_tls
        );

        let connection = match tokio::time::timeout(timeout, ConnectionManager::new(client)).await {
            Ok(result) => result.map_err(map_redis_error)?,
            Err(_) => {
                return Err(CacheError::Connection(format!(
                    "no connection to {}:{} after {:?}",
                    config.host, config.port, timeout
                )));
            }
        };

        Ok(Self {
            connection,
            prefix: config.key_prefix.clone(),
            timeout,
            _types: PhantomData,
        })
    }

    /// Get the configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, operation: Operation, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        with_timeout(operation, self.timeout, fut).await
    }
}

impl<K: Serialize, V> RedisStore<K, V> {
    fn encode_key(&self, key: &K) -> Result<String> {
        let json = serde_json::to_string(key)?;
        Ok(format!("{}{}", self.prefix, json))
    }
}

/// Keys fetched per `SCAN` round trip when clearing a prefix
const SCAN_BATCH: usize = 500;

/// Run one Redis round trip, failing with [`CacheError::Timeout`] once
/// `after` elapses
async fn with_timeout<T, F>(operation: Operation, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result.map_err(map_redis_error),
        Err(_) => Err(CacheError::Timeout { operation, after }),
    }
}

/// Escape glob metacharacters so the prefix only matches itself
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_redis_error(err: RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Connection(err.to_string())
    } else if err.kind() == ErrorKind::TypeError {
        CacheError::Serialization(err.to_string())
    } else {
        CacheError::Backend(err.to_string())
    }
}

#[async_trait]
impl<K, V> Store<K, V> for RedisStore<K, V>
where
    K: Serialize + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self, key: &K) -> Result<Option<V>> {
        let redis_key = self.encode_key(key)?;
        let mut conn = self.connection.clone();

        let raw: Option<String> = self.bounded(Operation::Read, conn.get(&redis_key)).await?;
        debug!("Redis tier GET {} (hit={})", redis_key, raw.is_some());

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: K, value: V) -> Result<()> {
        let redis_key = self.encode_key(&key)?;
        let json = serde_json::to_string(&value)?;
        let mut conn = self.connection.clone();

        let _: () = self
            .bounded(Operation::Write, conn.set(&redis_key, json))
            .await?;
        debug!("Redis tier SET {}", redis_key);
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<()> {
        let redis_key = self.encode_key(key)?;
        let mut conn = self.connection.clone();

        let _: () = self.bounded(Operation::Delete, conn.del(&redis_key)).await?;
        debug!("Redis tier DEL {}", redis_key);
        Ok(())
    }

    /// Without a prefix this flushes the whole database. With a prefix only
    /// the keys under it are removed, scanned in batches.
    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection.clone();

        if self.prefix.is_empty() {
            let _: () = self
                .bounded(Operation::Clear, redis::cmd("FLUSHDB").query_async(&mut conn))
                .await?;
            debug!("Redis tier FLUSHDB");
            return Ok(());
        }

        let pattern = format!("{}*", escape_glob(&self.prefix));
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded(
                    Operation::Clear,
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let _: () = self.bounded(Operation::Clear, conn.del(&keys)).await?;
                removed += keys.len();
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!("Redis tier CLEAR {} ({} keys)", pattern, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("app:"), "app:");
        assert_eq!(escape_glob("a?"), "a\\?");
        assert_eq!(escape_glob("t[12]:"), "t\\[12\\]:");
        assert_eq!(escape_glob("*\\"), "\\*\\\\");
    }

    #[test]
    fn test_escaped_prefix_pattern() {
        let pattern = format!("{}*", escape_glob("a?"));

        // Only the trailing wildcard is left unescaped
        assert_eq!(pattern, "a\\?*");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_reports_operation() {
        let after = Duration::from_millis(2000);
        let never = std::future::pending::<redis::RedisResult<()>>();

        let err = with_timeout(Operation::Write, after, never).await.unwrap_err();

        assert!(matches!(
            err,
            CacheError::Timeout {
                operation: Operation::Write,
                after: a,
            } if a == after
        ));
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_passes_result_through() {
        let ok = with_timeout(Operation::Read, Duration::from_secs(1), async {
            Ok::<_, RedisError>(Some(7u32))
        })
        .await
        .unwrap();
        assert_eq!(ok, Some(7));

        let err = with_timeout(Operation::Read, Duration::from_secs(1), async {
            Err::<(), _>(RedisError::from((ErrorKind::ResponseError, "WRONGTYPE")))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CacheError::Backend(_)));
    }

    #[test]
    fn test_map_redis_error_io_is_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = map_redis_error(RedisError::from(io));

        assert!(matches!(err, CacheError::Connection(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_map_redis_error_type_error_is_serialization() {
        let err = map_redis_error(RedisError::from((ErrorKind::TypeError, "bad type")));

        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[test]
    fn test_map_redis_error_response_is_backend() {
        let err = map_redis_error(RedisError::from((ErrorKind::ResponseError, "WRONGTYPE")));

        assert!(matches!(err, CacheError::Backend(_)));
    }
}
