//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Ingress Ports
//!
//! - `RateLimiter` - Per-client fixed-window request counting
//! - `ReplayStore` - Recently seen webhook event ids
//!
//! ## Persistence Ports
//!
//! - `SubscriptionRepository` - Subscription aggregate storage
//! - `UserCacheInvalidator` - Downstream per-user cache eviction
//!
//! ## Processor Ports
//!
//! - `CustomerRegistry` - Razorpay customer records
//! - `SubscriptionGateway` - Razorpay subscription management

mod customer_registry;
mod processor_error;
mod rate_limiter;
mod replay_store;
mod subscription_gateway;
mod subscription_repository;
mod user_cache;

pub use customer_registry::CustomerRegistry;
pub use processor_error::{ProcessorError, ProcessorErrorKind};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};
pub use replay_store::{ReplayStore, ReplayStoreError};
pub use subscription_gateway::{CreateSubscriptionRequest, GatewaySubscription, SubscriptionGateway};
pub use subscription_repository::SubscriptionRepository;
pub use user_cache::{CacheError, UserCacheInvalidator};
