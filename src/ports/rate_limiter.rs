//! Rate limiting port for webhook ingress.
//!
//! Fixed-window counters keyed by client identity. Implementations can use
//! in-memory storage (single instance) or Redis (shared across instances).

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Port for rate limiting operations.
///
/// Implementations should be thread-safe and support concurrent access.
/// Windows are fixed, not sliding: the counter resets at the window boundary.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, counting it if so.
    ///
    /// Returns `Allowed` with remaining quota or `Denied` with retry info.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    /// Which surface is being limited.
    pub namespace: &'static str,
    /// Identifier within the namespace (client address).
    pub identifier: String,
}

impl RateLimitKey {
    /// Key for a webhook sender identified by `client_id`.
    pub fn webhook_client(client_id: &str) -> Self {
        Self {
            namespace: "webhook",
            identifier: client_id.to_string(),
        }
    }

    /// Returns the Redis key string for this rate limit key.
    pub fn to_redis_key(&self) -> String {
        format!("ratelimit:{}:{}", self.namespace, self.identifier)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.identifier)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    /// Returns true if the request was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current rate limit status.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Seconds until the client should retry.
    pub retry_after_secs: u32,
    /// Human-readable message explaining the denial.
    pub message: String,
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_client_key_uses_webhook_namespace() {
        let key = RateLimitKey::webhook_client("203.0.113.7");
        assert_eq!(key.namespace, "webhook");
        assert_eq!(key.identifier, "203.0.113.7");
    }

    #[test]
    fn redis_key_format() {
        let key = RateLimitKey::webhook_client("203.0.113.7");
        assert_eq!(key.to_redis_key(), "ratelimit:webhook:203.0.113.7");
    }

    #[test]
    fn rate_limit_result_is_allowed_works() {
        let allowed = RateLimitResult::Allowed(RateLimitStatus {
            limit: 100,
            remaining: 99,
            reset_at: Timestamp::now(),
        });
        assert!(allowed.is_allowed());
        assert!(!allowed.is_denied());
    }

    #[test]
    fn rate_limit_result_is_denied_works() {
        let denied = RateLimitResult::Denied(RateLimitDenied {
            limit: 100,
            retry_after_secs: 30,
            message: "Too many requests".to_string(),
        });
        assert!(denied.is_denied());
        assert!(!denied.is_allowed());
    }
}
