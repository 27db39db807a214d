//! Webhook handlers.
//!
//! - `IngressGuard` - configuration, rate limit, signature and replay checks
//! - `WebhookEventRouter` - typed dispatch into the subscription lifecycle

mod event_router;
mod ingress_guard;

pub use event_router::{RouteOutcome, WebhookEventRouter};
pub use ingress_guard::{AdmittedWebhook, IngressGuard, IngressRequest, DEFAULT_REPLAY_WINDOW_SECS};
