/// Redis-backed identity cache
///
/// Uses a `redis::aio::ConnectionManager`, which reconnects on its own, so a
/// single `RedisIdentityCache` is cloned into every gateway. Snapshots are
/// stored as JSON strings with `SETEX`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use super::{cache_key, CacheError, CacheResult, IdentityCache};
use crate::auth::identity::CachedIdentity;

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => CacheError::ConnectionError(format!("IO error: {}", err)),
            redis::ErrorKind::ResponseError => {
                CacheError::CommandError(format!("Response error: {}", err))
            }
            _ => CacheError::CommandError(err.to_string()),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://localhost:6379`
    pub url: String,

    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            command_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// Loads configuration from the environment
    ///
    /// - `REDIS_URL` (default: `redis://localhost:6379`)
    /// - `REDIS_COMMAND_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> CacheResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let url = env::var("REDIS_URL").unwrap_or(defaults.url);

        let command_timeout_secs = match env::var("REDIS_COMMAND_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                CacheError::ConfigError(format!("Invalid REDIS_COMMAND_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => defaults.command_timeout_secs,
        };

        Ok(Self {
            url,
            command_timeout_secs,
        })
    }
}

/// Identity cache on Redis
#[derive(Clone)]
pub struct RedisIdentityCache {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisIdentityCache {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn connect(config: RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::ConfigError(format!("Invalid Redis URL: {}", e)))?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(url = %sanitize_url(&config.url), "Identity cache connected to Redis");

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Sends `PING`; true on `PONG`
    pub async fn ping(&self) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        let pong: String = self
            .with_timeout(async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        Ok(pong == "PONG")
    }

    async fn with_timeout<T, F>(&self, fut: F) -> CacheResult<T>
    where
        F: std::future::Future<Output = Result<T, RedisError>>,
    {
        tokio::time::timeout(Duration::from_secs(self.config.command_timeout_secs), fut)
            .await
            .map_err(|_| CacheError::ConnectionError("Redis command timed out".to_string()))?
            .map_err(CacheError::from)
    }
}

#[async_trait]
impl IdentityCache for RedisIdentityCache {
    async fn get(&self, user_id: i64) -> CacheResult<Option<CachedIdentity>> {
        let mut conn = self.manager.clone();
        let key = cache_key(user_id);

        let data: Option<String> = self.with_timeout(async move { conn.get(&key).await }).await?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, user_id: i64, snapshot: &CachedIdentity, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let key = cache_key(user_id);
        let json = serde_json::to_string(snapshot)?;
        let seconds = ttl.as_secs().max(1);

        self.with_timeout(async move {
            redis::cmd("SETEX")
                .arg(&key)
                .arg(seconds)
                .arg(json)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn invalidate(&self, user_id: i64) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        let key = cache_key(user_id);

        self.with_timeout(async move { conn.del::<_, ()>(&key).await })
            .await
    }
}

/// Replaces credentials in a Redis URL with `***:***` for logging
fn sanitize_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.find('@'), url.find("://")) {
        return format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..]);
    }
    url.to_string()
}
