//! Application layer - handlers that orchestrate domain operations over ports.

pub mod handlers;

pub use handlers::customer::{CustomerIdentityResolver, ResolveCustomerError};
pub use handlers::webhook::{
    AdmittedWebhook, IngressGuard, IngressRequest, RouteOutcome, WebhookEventRouter,
};
