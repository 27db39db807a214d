//! Downstream user-cache invalidation port.
//!
//! After a subscription is saved, the owning user's cached profile (which
//! embeds subscription state) must be dropped so the next read refetches it.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Port for evicting per-user cache entries.
#[async_trait]
pub trait UserCacheInvalidator: Send + Sync {
    /// Evict everything cached for `user_id`. Missing entries are not an error.
    async fn invalidate_user(&self, user_id: &UserId) -> Result<(), CacheError>;
}
