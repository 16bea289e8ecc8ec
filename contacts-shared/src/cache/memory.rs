/// In-process identity cache
///
/// Same contract as the Redis cache, including TTL expiry, backed by a
/// mutex-guarded map. Exposes [`MemoryIdentityCache::len`] so tests can
/// observe population and invalidation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{CacheResult, IdentityCache};
use crate::auth::identity::CachedIdentity;

#[derive(Default)]
pub struct MemoryIdentityCache {
    entries: Mutex<HashMap<i64, (CachedIdentity, Instant)>>,
}

impl MemoryIdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included until next access
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, (CachedIdentity, Instant)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityCache for MemoryIdentityCache {
    async fn get(&self, user_id: i64) -> CacheResult<Option<CachedIdentity>> {
        let mut entries = self.lock();

        match entries.get(&user_id) {
            Some((snapshot, expires_at)) if Instant::now() < *expires_at => {
                Ok(Some(snapshot.clone()))
            }
            Some(_) => {
                entries.remove(&user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, user_id: i64, snapshot: &CachedIdentity, ttl: Duration) -> CacheResult<()> {
        self.lock()
            .insert(user_id, (snapshot.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn invalidate(&self, user_id: i64) -> CacheResult<()> {
        self.lock().remove(&user_id);
        Ok(())
    }
}
