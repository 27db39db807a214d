//! Event classifier: which webhook kinds may move subscription status.
//!
//! Razorpay emits overlapping events for the same underlying change (a first
//! charge produces both `charged` and `activated`). Only the authoritative
//! set moves status; the informational set records what it would have done.

use super::status::SubscriptionStatus;
use crate::domain::webhook::WebhookEventType;

/// Events allowed to change subscription status.
pub const STATUS_CHANGE_EVENTS: [WebhookEventType; 8] = [
    WebhookEventType::SubscriptionActivated,
    WebhookEventType::SubscriptionPending,
    WebhookEventType::SubscriptionHalted,
    WebhookEventType::SubscriptionCancelled,
    WebhookEventType::SubscriptionCompleted,
    WebhookEventType::SubscriptionExpired,
    WebhookEventType::SubscriptionPaused,
    WebhookEventType::SubscriptionResumed,
];

/// Advisory events. They update auxiliary fields only.
pub const INFORMATIONAL_EVENTS: [WebhookEventType; 4] = [
    WebhookEventType::SubscriptionCharged,
    WebhookEventType::SubscriptionAuthenticated,
    WebhookEventType::PaymentAuthorized,
    WebhookEventType::PaymentFailed,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    StatusChange,
    Informational,
    /// Field refresh with no status meaning (`subscription.updated`).
    Auxiliary,
}

/// Classifies an event kind by membership in the two sets above.
pub fn classify(event: WebhookEventType) -> EventClass {
    if STATUS_CHANGE_EVENTS.contains(&event) {
        EventClass::StatusChange
    } else if INFORMATIONAL_EVENTS.contains(&event) {
        EventClass::Informational
    } else {
        EventClass::Auxiliary
    }
}

pub fn is_status_change_event(event: WebhookEventType) -> bool {
    classify(event) == EventClass::StatusChange
}

/// The status an event asserts.
///
/// For informational events this is the attempted status that gets recorded
/// as disallowed.
pub fn target_status(event: WebhookEventType) -> Option<SubscriptionStatus> {
    use SubscriptionStatus as S;
    use WebhookEventType as K;
    match event {
        K::SubscriptionActivated | K::SubscriptionResumed | K::SubscriptionCharged => {
            Some(S::Active)
        }
        K::SubscriptionPending | K::PaymentFailed => Some(S::Pending),
        K::SubscriptionHalted => Some(S::Halted),
        K::SubscriptionCancelled => Some(S::Cancelled),
        K::SubscriptionCompleted => Some(S::Completed),
        K::SubscriptionExpired => Some(S::Expired),
        K::SubscriptionPaused => Some(S::Paused),
        K::SubscriptionAuthenticated | K::PaymentAuthorized => Some(S::Authenticated),
        K::SubscriptionUpdated => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sets_are_disjoint() {
        for event in STATUS_CHANGE_EVENTS {
            assert!(!INFORMATIONAL_EVENTS.contains(&event));
        }
    }

    #[test]
    fn constants_agree_with_classify() {
        for event in STATUS_CHANGE_EVENTS {
            assert_eq!(classify(event), EventClass::StatusChange);
        }
        for event in INFORMATIONAL_EVENTS {
            assert_eq!(classify(event), EventClass::Informational);
        }
    }

    #[test]
    fn only_updated_falls_outside_both_sets() {
        let auxiliary: Vec<_> = WebhookEventType::ALL
            .into_iter()
            .filter(|event| classify(*event) == EventClass::Auxiliary)
            .collect();
        assert_eq!(auxiliary, vec![WebhookEventType::SubscriptionUpdated]);
    }

    #[test]
    fn updated_is_in_neither_set() {
        let event = WebhookEventType::SubscriptionUpdated;
        assert_eq!(classify(event), EventClass::Auxiliary);
        assert_eq!(target_status(event), None);
    }

    #[test]
    fn charged_asserts_active_but_is_not_authoritative() {
        let event = WebhookEventType::SubscriptionCharged;
        assert_eq!(target_status(event), Some(SubscriptionStatus::Active));
        assert!(!is_status_change_event(event));
    }

    #[test]
    fn resumed_maps_to_active() {
        assert_eq!(
            target_status(WebhookEventType::SubscriptionResumed),
            Some(SubscriptionStatus::Active)
        );
    }

    proptest! {
        #[test]
        fn every_event_has_exactly_one_class(index in 0usize..WebhookEventType::ALL.len()) {
            let event = WebhookEventType::ALL[index];
            let memberships = [
                STATUS_CHANGE_EVENTS.contains(&event),
                INFORMATIONAL_EVENTS.contains(&event),
                classify(event) == EventClass::Auxiliary,
            ];
            prop_assert_eq!(memberships.iter().filter(|m| **m).count(), 1);
        }

        #[test]
        fn status_change_events_always_assert_a_status(index in 0usize..STATUS_CHANGE_EVENTS.len()) {
            prop_assert!(target_status(STATUS_CHANGE_EVENTS[index]).is_some());
        }
    }
}
