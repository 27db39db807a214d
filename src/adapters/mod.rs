//! Adapters - Implementations of port interfaces.
//!
//! - `rate_limiter` - In-memory and Redis fixed-window limiters
//! - `replay` - In-memory and Redis replay stores
//! - `storage` - In-memory subscription repository
//! - `postgres` - PostgreSQL subscription repository
//! - `cache` - User-cache invalidators
//! - `razorpay` - Razorpay REST client and test registry
//! - `http` - Axum routes

pub mod cache;
pub mod http;
pub mod postgres;
pub mod rate_limiter;
pub mod razorpay;
pub mod replay;
pub mod storage;
