//! HTTP adapter for billing endpoints.
//!
//! - `POST /api/billing/webhooks/razorpay` - Razorpay subscription webhooks
//! - `POST /api/billing/customers` - Find or create the processor customer
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{client_id, BillingAppState, CustomerApiError, WebhookApiError, SIGNATURE_HEADER};
pub use routes::{app_router, billing_routes};
