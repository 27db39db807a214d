//! Process-local user-cache invalidators.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{CacheError, UserCacheInvalidator};

/// Records every invalidation. Used by tests to assert cache eviction.
#[derive(Debug, Clone, Default)]
pub struct RecordingUserCache {
    invalidated: Arc<RwLock<Vec<UserId>>>,
}

impl RecordingUserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users invalidated so far, in call order.
    pub async fn invalidated(&self) -> Vec<UserId> {
        self.invalidated.read().await.clone()
    }
}

#[async_trait]
impl UserCacheInvalidator for RecordingUserCache {
    async fn invalidate_user(&self, user_id: &UserId) -> Result<(), CacheError> {
        self.invalidated.write().await.push(user_id.clone());
        Ok(())
    }
}

/// For deployments without a shared cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUserCache;

#[async_trait]
impl UserCacheInvalidator for NoopUserCache {
    async fn invalidate_user(&self, _user_id: &UserId) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_cache_keeps_call_order() {
        let cache = RecordingUserCache::new();
        let a = UserId::new("a").unwrap();
        let b = UserId::new("b").unwrap();

        cache.invalidate_user(&a).await.unwrap();
        cache.invalidate_user(&b).await.unwrap();

        assert_eq!(cache.invalidated().await, vec![a, b]);
    }

    #[tokio::test]
    async fn noop_cache_always_succeeds() {
        let user = UserId::new("a").unwrap();
        assert!(NoopUserCache.invalidate_user(&user).await.is_ok());
    }
}
