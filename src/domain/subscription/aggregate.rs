//! Subscription aggregate entity.
//!
//! A Subscription is the local mirror of one Razorpay subscription. It is
//! created by the checkout flow and afterwards mutated only by webhook
//! processing. It is never deleted.
//!
//! # Design Decisions
//!
//! - **Status is private**: the only writer is [`Subscription::apply_status`],
//!   which consults the event classifier
//! - **Append-only audit**: every processed webhook adds exactly one
//!   [`WebhookLogEntry`]; the log is never truncated
//! - **Counts are processor data**: `paid_count` / `remaining_count` are
//!   copied from payloads, never incremented locally

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event_policy::is_status_change_event;
use super::status::SubscriptionStatus;
use crate::domain::foundation::{
    ExternalSubscriptionId, StateMachine, SubscriptionId, Timestamp, UserId,
};
use crate::domain::payment::PaymentMethod;
use crate::domain::webhook::WebhookEventType;

/// Reason recorded when an informational event attempts a status change.
pub const REASON_INFORMATIONAL: &str = "informational_event";

/// Reason recorded when a subscription is already in a terminal state.
pub const REASON_TERMINAL: &str = "terminal_state";

/// One processed webhook, as stored in `webhook_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLogEntry {
    pub event_type: WebhookEventType,
    pub event_data: LogEntryData,
    pub processed_at: Timestamp,
}

/// Audit payload. Status fields are absent for events with no status meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<SubscriptionStatus>,
    /// New status when allowed, attempted status otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_change_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Persistence view of a subscription, used to rebuild the aggregate.
#[derive(Debug, Clone)]
pub struct SubscriptionSnapshot {
    pub id: SubscriptionId,
    pub external_subscription_id: ExternalSubscriptionId,
    pub user_id: UserId,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub next_billing_date: Option<Timestamp>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub paid_count: u32,
    pub remaining_count: u32,
    pub payment_method: Option<PaymentMethod>,
    pub webhook_events: Vec<WebhookLogEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub version: u64,
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `external_subscription_id` is unique
/// - `status` only changes through `apply_status` for a status-change event
/// - Terminal statuses never change
/// - `webhook_events` only grows
/// - `version` is the stored revision this copy was loaded at; a save
///   against a newer revision is refused
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub external_subscription_id: ExternalSubscriptionId,
    pub user_id: UserId,
    status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub next_billing_date: Option<Timestamp>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub paid_count: u32,
    pub remaining_count: u32,
    pub payment_method: Option<PaymentMethod>,
    webhook_events: Vec<WebhookLogEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    version: u64,
}

impl Subscription {
    /// Creates the record written at checkout time.
    pub fn create(
        external_subscription_id: ExternalSubscriptionId,
        user_id: UserId,
        status: SubscriptionStatus,
        start_date: Timestamp,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            external_subscription_id,
            user_id,
            status,
            start_date,
            end_date: None,
            next_billing_date: None,
            current_period_start: None,
            current_period_end: None,
            paid_count: 0,
            remaining_count: 0,
            payment_method: None,
            webhook_events: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Rebuilds a subscription from storage.
    pub fn from_snapshot(snapshot: SubscriptionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            external_subscription_id: snapshot.external_subscription_id,
            user_id: snapshot.user_id,
            status: snapshot.status,
            start_date: snapshot.start_date,
            end_date: snapshot.end_date,
            next_billing_date: snapshot.next_billing_date,
            current_period_start: snapshot.current_period_start,
            current_period_end: snapshot.current_period_end,
            paid_count: snapshot.paid_count,
            remaining_count: snapshot.remaining_count,
            payment_method: snapshot.payment_method,
            webhook_events: snapshot.webhook_events,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            version: snapshot.version,
        }
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Copy as stored after a successful save.
    pub(crate) fn saved(&self) -> Self {
        Self {
            version: self.version + 1,
            ..self.clone()
        }
    }

    /// Audit log in processing order.
    pub fn webhook_events(&self) -> &[WebhookLogEntry] {
        &self.webhook_events
    }

    /// Applies `new_status` on behalf of `event_type`, returning whether it changed.
    ///
    /// Always appends exactly one log entry:
    /// - informational events record the attempted status as disallowed
    /// - terminal subscriptions record the attempt as disallowed
    /// - otherwise the status moves and the entry records before and after
    pub fn apply_status(
        &mut self,
        new_status: SubscriptionStatus,
        event_type: WebhookEventType,
        details: Map<String, Value>,
        at: Timestamp,
    ) -> bool {
        let previous = self.status;

        let refusal = if !is_status_change_event(event_type) {
            Some(REASON_INFORMATIONAL)
        } else if previous.transition_to(new_status).is_err() {
            Some(REASON_TERMINAL)
        } else {
            None
        };

        if refusal.is_none() {
            self.status = new_status;
        }

        self.push_entry(
            event_type,
            LogEntryData {
                previous_status: Some(previous),
                status: Some(new_status),
                status_change_allowed: Some(refusal.is_none()),
                reason: refusal.map(str::to_string),
                details,
            },
            at,
        );

        refusal.is_none()
    }

    /// Appends a log entry that carries no status information.
    pub fn record_event(
        &mut self,
        event_type: WebhookEventType,
        details: Map<String, Value>,
        at: Timestamp,
    ) {
        self.push_entry(
            event_type,
            LogEntryData {
                details,
                ..LogEntryData::default()
            },
            at,
        );
    }

    fn push_entry(&mut self, event_type: WebhookEventType, event_data: LogEntryData, at: Timestamp) {
        self.webhook_events.push(WebhookLogEntry {
            event_type,
            event_data,
            processed_at: at,
        });
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscription(status: SubscriptionStatus) -> Subscription {
        Subscription::create(
            ExternalSubscriptionId::new("sub_test").unwrap(),
            UserId::new("user-1").unwrap(),
            status,
            Timestamp::from_unix_secs(1_700_000_000).unwrap(),
        )
    }

    fn details(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // apply_status Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn status_change_event_moves_status_and_logs_before_after() {
        let mut sub = subscription(SubscriptionStatus::Authenticated);
        let at = Timestamp::now();

        let changed = sub.apply_status(
            SubscriptionStatus::Active,
            WebhookEventType::SubscriptionActivated,
            Map::new(),
            at,
        );

        assert!(changed);
        assert_eq!(sub.status(), SubscriptionStatus::Active);
        assert_eq!(sub.webhook_events().len(), 1);
        let entry = &sub.webhook_events()[0];
        assert_eq!(entry.event_type, WebhookEventType::SubscriptionActivated);
        assert_eq!(
            entry.event_data.previous_status,
            Some(SubscriptionStatus::Authenticated)
        );
        assert_eq!(entry.event_data.status, Some(SubscriptionStatus::Active));
        assert_eq!(entry.event_data.status_change_allowed, Some(true));
        assert_eq!(entry.processed_at, at);
        assert_eq!(sub.updated_at, at);
    }

    #[test]
    fn informational_event_never_moves_status() {
        let mut sub = subscription(SubscriptionStatus::Authenticated);

        let changed = sub.apply_status(
            SubscriptionStatus::Active,
            WebhookEventType::SubscriptionCharged,
            details(json!({"wasFirstPayment": true})),
            Timestamp::now(),
        );

        assert!(!changed);
        assert_eq!(sub.status(), SubscriptionStatus::Authenticated);
        let data = &sub.webhook_events()[0].event_data;
        assert_eq!(data.status, Some(SubscriptionStatus::Active));
        assert_eq!(data.status_change_allowed, Some(false));
        assert_eq!(data.reason.as_deref(), Some(REASON_INFORMATIONAL));
        assert_eq!(data.details["wasFirstPayment"], json!(true));
    }

    #[test]
    fn terminal_subscription_refuses_status_change() {
        let mut sub = subscription(SubscriptionStatus::Cancelled);

        let changed = sub.apply_status(
            SubscriptionStatus::Active,
            WebhookEventType::SubscriptionResumed,
            Map::new(),
            Timestamp::now(),
        );

        assert!(!changed);
        assert_eq!(sub.status(), SubscriptionStatus::Cancelled);
        let data = &sub.webhook_events()[0].event_data;
        assert_eq!(data.status_change_allowed, Some(false));
        assert_eq!(data.reason.as_deref(), Some(REASON_TERMINAL));
    }

    #[test]
    fn same_status_is_allowed_and_logged() {
        let mut sub = subscription(SubscriptionStatus::Halted);

        let changed = sub.apply_status(
            SubscriptionStatus::Halted,
            WebhookEventType::SubscriptionHalted,
            Map::new(),
            Timestamp::now(),
        );

        assert!(changed);
        assert_eq!(sub.webhook_events().len(), 1);
    }

    // ══════════════════════════════════════════════════════════════
    // record_event Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn record_event_appends_without_status_fields() {
        let mut sub = subscription(SubscriptionStatus::Active);

        sub.record_event(
            WebhookEventType::SubscriptionUpdated,
            details(json!({"planId": "plan_2"})),
            Timestamp::now(),
        );

        assert_eq!(sub.status(), SubscriptionStatus::Active);
        let json = serde_json::to_value(&sub.webhook_events()[0]).unwrap();
        assert_eq!(json["eventType"], "subscription.updated");
        assert_eq!(json["eventData"]["planId"], "plan_2");
        assert!(json["eventData"].get("statusChangeAllowed").is_none());
        assert!(json["eventData"].get("status").is_none());
    }

    #[test]
    fn log_entry_serializes_camel_case_and_roundtrips() {
        let mut sub = subscription(SubscriptionStatus::Authenticated);
        sub.apply_status(
            SubscriptionStatus::Pending,
            WebhookEventType::PaymentFailed,
            details(json!({"paymentId": "pay_1"})),
            Timestamp::now(),
        );

        let entry = &sub.webhook_events()[0];
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["eventData"]["previousStatus"], "authenticated");
        assert_eq!(json["eventData"]["statusChangeAllowed"], false);
        assert_eq!(json["eventData"]["paymentId"], "pay_1");

        let back: WebhookLogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(&back, entry);
    }

    #[test]
    fn log_only_grows() {
        let mut sub = subscription(SubscriptionStatus::Authenticated);
        let events = [
            WebhookEventType::SubscriptionAuthenticated,
            WebhookEventType::SubscriptionActivated,
            WebhookEventType::SubscriptionCharged,
            WebhookEventType::SubscriptionCancelled,
            WebhookEventType::SubscriptionResumed,
        ];

        for (i, event) in events.into_iter().enumerate() {
            sub.apply_status(
                SubscriptionStatus::Active,
                event,
                Map::new(),
                Timestamp::now(),
            );
            assert_eq!(sub.webhook_events().len(), i + 1);
        }
    }

    #[test]
    fn snapshot_restores_private_state() {
        let mut original = subscription(SubscriptionStatus::Authenticated);
        original.apply_status(
            SubscriptionStatus::Active,
            WebhookEventType::SubscriptionActivated,
            Map::new(),
            Timestamp::now(),
        );

        let restored = Subscription::from_snapshot(SubscriptionSnapshot {
            id: original.id,
            external_subscription_id: original.external_subscription_id.clone(),
            user_id: original.user_id.clone(),
            status: original.status(),
            start_date: original.start_date,
            end_date: original.end_date,
            next_billing_date: original.next_billing_date,
            current_period_start: original.current_period_start,
            current_period_end: original.current_period_end,
            paid_count: original.paid_count,
            remaining_count: original.remaining_count,
            payment_method: original.payment_method.clone(),
            webhook_events: original.webhook_events().to_vec(),
            created_at: original.created_at,
            updated_at: original.updated_at,
            version: original.version(),
        });

        assert_eq!(restored, original);
    }

    #[test]
    fn saved_copy_advances_version_only() {
        let original = subscription(SubscriptionStatus::Active);
        let saved = original.saved();

        assert_eq!(original.version(), 0);
        assert_eq!(saved.version(), 1);
        assert_eq!(saved.status(), original.status());
        assert_eq!(saved.id, original.id);
    }
}
