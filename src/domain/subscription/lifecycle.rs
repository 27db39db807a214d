//! Per-event transitions and side effects.
//!
//! Each webhook kind maps to one function here. Status-change events go
//! through [`Subscription::apply_status`] first and apply their extra effects
//! only when the status actually moved. Informational events refresh
//! auxiliary fields and then record their attempted status as disallowed.

use serde_json::{json, Map, Value};

use super::aggregate::Subscription;
use super::event_policy::target_status;
use super::status::SubscriptionStatus;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{sanitize, RawPayment};
use crate::domain::webhook::{SubscriptionEntity, SubscriptionEvent, WebhookEventType};

/// Applies a typed webhook to the subscription. Returns true if status changed.
pub fn apply_event(subscription: &mut Subscription, event: &SubscriptionEvent, now: Timestamp) -> bool {
    match event {
        SubscriptionEvent::Activated(entity) => on_activated(subscription, entity, now),
        SubscriptionEvent::Pending(entity) => {
            on_plain_transition(subscription, WebhookEventType::SubscriptionPending, entity, now)
        }
        SubscriptionEvent::Halted(entity) => {
            on_plain_transition(subscription, WebhookEventType::SubscriptionHalted, entity, now)
        }
        SubscriptionEvent::Paused(entity) => {
            on_plain_transition(subscription, WebhookEventType::SubscriptionPaused, entity, now)
        }
        SubscriptionEvent::Resumed(entity) => {
            on_plain_transition(subscription, WebhookEventType::SubscriptionResumed, entity, now)
        }
        SubscriptionEvent::Cancelled(entity) => {
            on_ended(subscription, WebhookEventType::SubscriptionCancelled, entity, now)
        }
        SubscriptionEvent::Expired(entity) => {
            on_ended(subscription, WebhookEventType::SubscriptionExpired, entity, now)
        }
        SubscriptionEvent::Completed(entity) => {
            on_ended(subscription, WebhookEventType::SubscriptionCompleted, entity, now)
        }
        SubscriptionEvent::Charged {
            subscription: entity,
            payment,
        } => on_charged(subscription, entity, payment.as_ref(), now),
        SubscriptionEvent::Authenticated(entity) => on_authenticated(subscription, entity, now),
        SubscriptionEvent::Updated(entity) => {
            on_updated(subscription, entity, now);
            false
        }
        SubscriptionEvent::PaymentAuthorized { payment, .. } => on_payment(
            subscription,
            WebhookEventType::PaymentAuthorized,
            payment,
            now,
        ),
        SubscriptionEvent::PaymentFailed { payment, .. } => on_payment(
            subscription,
            WebhookEventType::PaymentFailed,
            payment,
            now,
        ),
    }
}

fn on_activated(subscription: &mut Subscription, entity: &SubscriptionEntity, now: Timestamp) -> bool {
    let details = object(json!({
        "startAt": entity.start_at,
        "chargeAt": entity.charge_at,
        "paidCount": entity.paid_count,
        "remainingCount": entity.remaining_count,
    }));

    if !apply_target(subscription, WebhookEventType::SubscriptionActivated, details, now) {
        return false;
    }

    subscription.start_date = entity
        .start_at
        .or(entity.current_start)
        .and_then(Timestamp::from_unix_secs)
        .unwrap_or(now);
    refresh_billing_window(subscription, entity);
    refresh_counts(subscription, entity);
    true
}

fn on_plain_transition(
    subscription: &mut Subscription,
    event_type: WebhookEventType,
    entity: &SubscriptionEntity,
    now: Timestamp,
) -> bool {
    let details = object(json!({ "processorStatus": entity.status }));
    apply_target(subscription, event_type, details, now)
}

fn on_ended(
    subscription: &mut Subscription,
    event_type: WebhookEventType,
    entity: &SubscriptionEntity,
    now: Timestamp,
) -> bool {
    let details = object(json!({ "endedAt": entity.ended_at }));

    if !apply_target(subscription, event_type, details, now) {
        return false;
    }

    subscription.end_date = Some(unix_or(entity.ended_at, now));
    if event_type == WebhookEventType::SubscriptionCompleted {
        subscription.remaining_count = 0;
    }
    true
}

fn on_charged(
    subscription: &mut Subscription,
    entity: &SubscriptionEntity,
    payment: Option<&RawPayment>,
    now: Timestamp,
) -> bool {
    let was_first_payment = subscription.paid_count == 0;

    refresh_counts(subscription, entity);
    refresh_billing_window(subscription, entity);
    if let Some(payment) = payment {
        subscription.payment_method = Some(sanitize(payment));
    }

    let mut details = object(json!({
        "paidCount": subscription.paid_count,
        "remainingCount": subscription.remaining_count,
        "wasFirstPayment": was_first_payment,
    }));
    if let Some(payment) = payment {
        details.insert("paymentId".into(), json!(payment.id));
        details.insert("amount".into(), json!(payment.amount));
        details.insert("currency".into(), json!(payment.currency));
    }

    apply_target(subscription, WebhookEventType::SubscriptionCharged, details, now)
}

fn on_authenticated(
    subscription: &mut Subscription,
    entity: &SubscriptionEntity,
    now: Timestamp,
) -> bool {
    if let Some(next) = entity.charge_at.and_then(Timestamp::from_unix_secs) {
        subscription.next_billing_date = Some(next);
    }

    let details = object(json!({ "chargeAt": entity.charge_at }));
    apply_target(subscription, WebhookEventType::SubscriptionAuthenticated, details, now)
}

fn on_updated(subscription: &mut Subscription, entity: &SubscriptionEntity, now: Timestamp) {
    refresh_counts(subscription, entity);
    refresh_billing_window(subscription, entity);

    let details = object(json!({
        "planId": entity.plan_id,
        "paidCount": entity.paid_count,
        "remainingCount": entity.remaining_count,
    }));
    subscription.record_event(WebhookEventType::SubscriptionUpdated, details, now);
}

fn on_payment(
    subscription: &mut Subscription,
    event_type: WebhookEventType,
    payment: &RawPayment,
    now: Timestamp,
) -> bool {
    let failure = event_type == WebhookEventType::PaymentFailed;
    let details = object(json!({
        "paymentId": payment.id,
        "amount": payment.amount,
        "method": payment.method,
        "errorCode": payment.error_code.as_ref().filter(|_| failure),
        "errorDescription": payment.error_description.as_ref().filter(|_| failure),
    }));

    apply_target(subscription, event_type, details, now)
}

fn apply_target(
    subscription: &mut Subscription,
    event_type: WebhookEventType,
    details: Map<String, Value>,
    now: Timestamp,
) -> bool {
    // Every kind routed here has a target; updated is handled separately.
    let target = target_status(event_type).unwrap_or(subscription.status());
    subscription.apply_status(target, event_type, details, now)
}

fn refresh_counts(subscription: &mut Subscription, entity: &SubscriptionEntity) {
    if let Some(paid) = entity.paid_count {
        subscription.paid_count = paid;
    }
    if let Some(remaining) = entity.remaining_count {
        subscription.remaining_count = remaining;
    }
}

fn refresh_billing_window(subscription: &mut Subscription, entity: &SubscriptionEntity) {
    if let Some(start) = entity.current_start.and_then(Timestamp::from_unix_secs) {
        subscription.current_period_start = Some(start);
    }
    if let Some(end) = entity.current_end.and_then(Timestamp::from_unix_secs) {
        subscription.current_period_end = Some(end);
    }
    if let Some(next) = entity.charge_at.and_then(Timestamp::from_unix_secs) {
        subscription.next_billing_date = Some(next);
    }
}

fn unix_or(secs: Option<i64>, fallback: Timestamp) -> Timestamp {
    secs.and_then(Timestamp::from_unix_secs).unwrap_or(fallback)
}

/// Drops null values so audit entries only carry what the payload had.
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        _ => Map::new(),
    }
}
