//! Redis user-cache invalidator.
//!
//! The downstream profile service caches each user under
//! `{prefix}:{user_id}` and the user's subscription summary under
//! `{prefix}:{user_id}:subscription`. Both are dropped together.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::UserId;
use crate::ports::{CacheError, UserCacheInvalidator};

#[derive(Clone)]
pub struct RedisUserCache {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisUserCache {
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    fn keys_for(&self, user_id: &UserId) -> [String; 2] {
        let base = format!("{}:{}", self.key_prefix, user_id);
        let subscription = format!("{}:subscription", base);
        [base, subscription]
    }
}

#[async_trait]
impl UserCacheInvalidator for RedisUserCache {
    async fn invalidate_user(&self, user_id: &UserId) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&self.keys_for(user_id)[..])
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))
    }
}

impl std::fmt::Debug for RedisUserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisUserCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
