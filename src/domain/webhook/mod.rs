//! Webhook module - Razorpay delivery parsing, verification, and errors.

mod errors;
mod event;
mod replay;
mod signature;

pub use errors::WebhookError;
pub use event::{
    EntityWrapper, SubscriptionEntity, SubscriptionEvent, WebhookEnvelope, WebhookEventType,
    WebhookPayload,
};
pub use replay::replay_event_id;
pub use signature::{sign_payload, WebhookSignatureVerifier};
