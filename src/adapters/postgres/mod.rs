//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Subscription aggregate persistence

mod subscription_repository;

pub use subscription_repository::PostgresSubscriptionRepository;
