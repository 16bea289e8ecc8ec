/// Identity cache
///
/// Short-TTL read-through cache from user id to a [`CachedIdentity`]
/// snapshot. Entries live under `user:{id}` and expire after the configured
/// TTL (5 minutes by default). Any mutation of a user's profile fields must
/// call [`IdentityCache::invalidate`] before the mutating request returns.
///
/// # Backends
///
/// - [`redis`]: `SETEX`/`GET`/`DEL` on a shared Redis, JSON values
/// - [`memory`]: process-local map with per-entry expiry, for tests
///
/// # Example
///
/// ```no_run
/// use contacts_shared::cache::{IdentityCache, redis::{RedisConfig, RedisIdentityCache}};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = RedisIdentityCache::connect(RedisConfig::from_env()?).await?;
/// if let Some(snapshot) = cache.get(42).await? {
///     println!("cached username: {}", snapshot.username);
/// }
/// cache.invalidate(42).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::time::Duration;

use crate::auth::identity::CachedIdentity;

pub mod memory;
pub mod redis;

pub use memory::MemoryIdentityCache;
pub use redis::RedisIdentityCache;

/// Default lifetime of a cached identity
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache key for a user id
pub fn cache_key(user_id: i64) -> String {
    format!("user:{}", user_id)
}

/// Identity cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Cannot reach the backing store
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Command rejected or failed
    #[error("Cache command error: {0}")]
    CommandError(String),

    /// Stored value could not be (de)serialized
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Cache configuration error: {0}")]
    ConfigError(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache of identity snapshots
#[async_trait]
pub trait IdentityCache: Send + Sync {
    /// Returns the snapshot if present and unexpired
    async fn get(&self, user_id: i64) -> CacheResult<Option<CachedIdentity>>;

    /// Stores or overwrites the snapshot with the given TTL
    async fn put(&self, user_id: i64, snapshot: &CachedIdentity, ttl: Duration) -> CacheResult<()>;

    /// Removes the entry immediately
    async fn invalidate(&self, user_id: i64) -> CacheResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(42), "user:42");
    }

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(DEFAULT_TTL.as_secs(), 300);
    }
}
