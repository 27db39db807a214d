//! Storage adapters that need no external service.
//!
//! - `InMemorySubscriptionRepository` - map-backed subscription storage

mod in_memory_subscription_repository;

pub use in_memory_subscription_repository::InMemorySubscriptionRepository;
