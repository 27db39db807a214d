//! Subscription Sync - Razorpay subscription webhook processing
//!
//! Keeps locally stored subscription records synchronized with the
//! processor's subscription lifecycle. Deliveries pass an ingress guard
//! (configuration, rate limit, signature, replay) before a typed router
//! applies them to the subscription state machine.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
