//! In-memory rate limiter implementation.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Counts are per process: with several instances running, each enforces
//! its own limit.
//!
//! Client identities come from request headers and are unbounded, so closed
//! windows are swept lazily from `check_at`, at most once per window length.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::config::RateLimitConfig;

/// In-memory rate limiter for tests and single-instance deployments.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    table: Arc<RwLock<WindowTable>>,
}

#[derive(Debug, Default)]
struct WindowTable {
    /// `clientId -> {count, windowResetTime}`.
    windows: HashMap<String, WindowState>,
    /// Unix seconds of the next sweep of closed windows.
    next_sweep_at: i64,
}

#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// Unix seconds at which the window resets.
    reset_at: i64,
}

impl WindowTable {
    fn sweep(&mut self, now: i64, window_secs: u32) {
        if now < self.next_sweep_at {
            return;
        }
        let before = self.windows.len();
        self.windows.retain(|_, state| state.reset_at > now);
        let removed = before - self.windows.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.windows.len(), "Swept closed rate-limit windows");
        }
        self.next_sweep_at = now + i64::from(window_secs);
    }
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            table: Arc::new(RwLock::new(WindowTable::default())),
        }
    }

    /// Create a rate limiter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// `check` evaluated at an explicit instant.
    pub async fn check_at(&self, key: &RateLimitKey, now: Timestamp) -> RateLimitResult {
        let limit = self.config.max_requests;
        let window_secs = self.config.window_secs;
        let now = now.as_unix_secs();

        let mut table = self.table.write().await;
        table.sweep(now, window_secs);

        let state = table
            .windows
            .entry(key.to_redis_key())
            .or_insert_with(|| WindowState {
                count: 0,
                reset_at: now + i64::from(window_secs),
            });

        // Fixed window: start over once the boundary has passed.
        if now >= state.reset_at {
            state.count = 0;
            state.reset_at = now + i64::from(window_secs);
        }

        if state.count >= limit {
            let retry_after = (state.reset_at - now).max(1) as u32;
            return RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs: retry_after,
                message: format!(
                    "Rate limit exceeded for {}. Retry after {} seconds.",
                    key, retry_after
                ),
            });
        }

        state.count += 1;

        RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(state.count),
            reset_at: Timestamp::from_unix_secs(state.reset_at).unwrap_or_default(),
        })
    }

    /// Number of client windows currently held.
    pub async fn tracked_clients(&self) -> usize {
        self.table.read().await.windows.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(&key, Timestamp::now()).await)
    }
}
