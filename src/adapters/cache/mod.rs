//! User-cache invalidation adapters.
//!
//! - `RedisUserCache` - deletes the user's keys from the shared Redis
//! - `RecordingUserCache` - in-memory, records calls for assertions
//! - `NoopUserCache` - used when no cache is configured

mod in_memory_user_cache;
mod redis_user_cache;

pub use in_memory_user_cache::{NoopUserCache, RecordingUserCache};
pub use redis_user_cache::RedisUserCache;
