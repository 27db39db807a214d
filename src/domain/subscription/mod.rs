//! Subscription module - the locally mirrored Razorpay subscription.
//!
//! # Module Structure
//!
//! - `status` - Lifecycle states and the terminal-state rule
//! - `event_policy` - Which webhook kinds may move status
//! - `aggregate` - The Subscription entity and its audit log
//! - `lifecycle` - Per-event transitions and side effects

mod aggregate;
mod event_policy;
mod lifecycle;
mod status;

pub use aggregate::{
    LogEntryData, Subscription, SubscriptionSnapshot, WebhookLogEntry, REASON_INFORMATIONAL,
    REASON_TERMINAL,
};
pub use event_policy::{
    classify, is_status_change_event, target_status, EventClass, INFORMATIONAL_EVENTS,
    STATUS_CHANGE_EVENTS,
};
pub use lifecycle::apply_event;
pub use status::SubscriptionStatus;
