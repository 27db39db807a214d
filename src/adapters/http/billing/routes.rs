//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_razorpay_webhook, health, resolve_customer, BillingAppState};

/// Billing API routes, mounted under `/billing`.
///
/// # Routes
/// - `POST /customers` - Find or create the processor customer
/// - `POST /webhooks/razorpay` - Razorpay webhooks (no auth, signature verified)
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/customers", post(resolve_customer))
        .route("/webhooks/razorpay", post(handle_razorpay_webhook))
}

/// Complete application router.
///
/// ```ignore
/// let app = app_router(state).layer(TraceLayer::new_for_http());
/// ```
pub fn app_router(state: BillingAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/billing", billing_routes())
        .with_state(state)
}
