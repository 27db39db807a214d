//! Application handlers.
//!
//! - `webhook` - Ingress checks and event routing for Razorpay deliveries
//! - `customer` - Find-or-create against the processor customer registry

pub mod customer;
pub mod webhook;
