//! Razorpay adapter.
//!
//! Implements the outbound processor ports:
//! - `CustomerRegistry` - list, create and edit customers
//! - `SubscriptionGateway` - create, fetch, cancel, pause and resume subscriptions
//!
//! Inbound webhook verification lives in `domain::webhook`.
//!
//! # Configuration
//!
//! - `SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_ID`
//! - `SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_SECRET`

mod api_types;
mod client;
mod mock_customer_registry;

pub use api_types::{RazorpayCollection, RazorpayCustomer, RazorpaySubscription};
pub use client::{RazorpayClient, RazorpayConfig, DEFAULT_API_BASE_URL};
pub use mock_customer_registry::{MockCustomerRegistry, RegistryCalls};
