//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine trait)
//! - `subscription` - Subscription aggregate, status policy and lifecycle
//! - `payment` - Raw payment records and the sanitizer
//! - `customer` - Processor customer identity values
//! - `webhook` - Event enumeration, envelope, signature and replay keys

pub mod customer;
pub mod foundation;
pub mod payment;
pub mod subscription;
pub mod webhook;
