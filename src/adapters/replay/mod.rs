//! Replay store adapters.
//!
//! - `InMemoryReplayStore` - Process-local map with lazy sweep
//! - `RedisReplayStore` - TTL keys with atomic claim

mod in_memory;
mod redis;

pub use in_memory::InMemoryReplayStore;
pub use redis::RedisReplayStore;
