//! Replay key derivation.
//!
//! A delivery is identified by `event + ":" + primary entity id`, where the
//! primary entity is the payment if present, else the subscription. When
//! neither carries an id the current time in milliseconds is used, which
//! makes such deliveries effectively never deduplicated.

use super::event::WebhookEnvelope;
use crate::domain::foundation::Timestamp;

/// Derives the replay key for an envelope received at `now`.
pub fn replay_event_id(envelope: &WebhookEnvelope, now: Timestamp) -> String {
    let entity = envelope
        .payload
        .payment_id()
        .or_else(|| envelope.payload.subscription_id())
        .map(str::to_string)
        .unwrap_or_else(|| now.as_unix_millis().to_string());

    format!("{}:{}", envelope.event, entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> WebhookEnvelope {
        WebhookEnvelope::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn prefers_payment_id() {
        let env = envelope(json!({
            "event": "subscription.charged",
            "payload": {
                "subscription": {"entity": {"id": "sub_1"}},
                "payment": {"entity": {"id": "pay_1"}}
            }
        }));

        assert_eq!(replay_event_id(&env, Timestamp::now()), "subscription.charged:pay_1");
    }

    #[test]
    fn falls_back_to_subscription_id() {
        let env = envelope(json!({
            "event": "subscription.cancelled",
            "payload": {"subscription": {"entity": {"id": "sub_1"}}}
        }));

        assert_eq!(replay_event_id(&env, Timestamp::now()), "subscription.cancelled:sub_1");
    }

    #[test]
    fn falls_back_to_receive_time() {
        let env = envelope(json!({"event": "subscription.updated", "payload": {}}));
        let now = Timestamp::from_unix_secs(1_700_000_000).unwrap();

        assert_eq!(replay_event_id(&env, now), "subscription.updated:1700000000000");
    }

    #[test]
    fn same_event_for_different_entities_differs() {
        let a = envelope(json!({
            "event": "subscription.halted",
            "payload": {"subscription": {"entity": {"id": "sub_a"}}}
        }));
        let b = envelope(json!({
            "event": "subscription.halted",
            "payload": {"subscription": {"entity": {"id": "sub_b"}}}
        }));
        let now = Timestamp::now();

        assert_ne!(replay_event_id(&a, now), replay_event_id(&b, now));
    }
}
