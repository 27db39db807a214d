//! Redis-backed replay store.
//!
//! Each event id is a key with a TTL equal to the replay window, so Redis
//! performs eviction and `sweep` has nothing to do. `claim` is a single
//! `SET NX EX`, which makes duplicate detection hold across instances.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::Timestamp;
use crate::ports::{ReplayStore, ReplayStoreError};

#[derive(Clone)]
pub struct RedisReplayStore {
    conn: MultiplexedConnection,
    window_secs: u64,
}

impl RedisReplayStore {
    pub fn new(conn: MultiplexedConnection, window_secs: u64) -> Self {
        Self { conn, window_secs }
    }

    fn key(event_id: &str) -> String {
        format!("webhook:replay:{}", event_id)
    }
}

fn unavailable(e: redis::RedisError) -> ReplayStoreError {
    ReplayStoreError::Unavailable(e.to_string())
}

#[async_trait]
impl ReplayStore for RedisReplayStore {
    async fn get(&self, event_id: &str) -> Result<Option<Timestamp>, ReplayStoreError> {
        let mut conn = self.conn.clone();
        let seen: Option<i64> = conn.get(Self::key(event_id)).await.map_err(unavailable)?;
        Ok(seen.and_then(Timestamp::from_unix_secs))
    }

    async fn set(&self, event_id: &str, seen_at: Timestamp) -> Result<(), ReplayStoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(Self::key(event_id))
            .arg(seen_at.as_unix_secs())
            .arg("EX")
            .arg(self.window_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn sweep(&self, _cutoff: Timestamp) -> Result<u64, ReplayStoreError> {
        Ok(0)
    }

    async fn claim(&self, event_id: &str, seen_at: Timestamp) -> Result<bool, ReplayStoreError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(event_id))
            .arg(seen_at.as_unix_secs())
            .arg("NX")
            .arg("EX")
            .arg(self.window_secs)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(reply.is_some())
    }
}

impl std::fmt::Debug for RedisReplayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisReplayStore")
            .field("window_secs", &self.window_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(
            RedisReplayStore::key("subscription.charged:pay_1"),
            "webhook:replay:subscription.charged:pay_1"
        );
    }
}
