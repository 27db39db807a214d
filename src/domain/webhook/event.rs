//! Razorpay webhook envelope, event kinds, and typed per-event payloads.
//!
//! The envelope is parsed loosely (nested entities stay as JSON) so that a
//! malformed entity fails only the handler that reads it. Each handled event
//! kind is then lifted into a [`SubscriptionEvent`] with explicit optional
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::WebhookError;
use crate::domain::foundation::ExternalSubscriptionId;
use crate::domain::payment::RawPayment;

/// Closed set of Razorpay event kinds this subsystem handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "subscription.authenticated")]
    SubscriptionAuthenticated,
    #[serde(rename = "subscription.activated")]
    SubscriptionActivated,
    #[serde(rename = "subscription.charged")]
    SubscriptionCharged,
    #[serde(rename = "subscription.pending")]
    SubscriptionPending,
    #[serde(rename = "subscription.halted")]
    SubscriptionHalted,
    #[serde(rename = "subscription.cancelled")]
    SubscriptionCancelled,
    #[serde(rename = "subscription.completed")]
    SubscriptionCompleted,
    #[serde(rename = "subscription.expired")]
    SubscriptionExpired,
    #[serde(rename = "subscription.paused")]
    SubscriptionPaused,
    #[serde(rename = "subscription.resumed")]
    SubscriptionResumed,
    #[serde(rename = "subscription.updated")]
    SubscriptionUpdated,
    #[serde(rename = "payment.authorized")]
    PaymentAuthorized,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
}

impl WebhookEventType {
    pub const ALL: [WebhookEventType; 13] = [
        Self::SubscriptionAuthenticated,
        Self::SubscriptionActivated,
        Self::SubscriptionCharged,
        Self::SubscriptionPending,
        Self::SubscriptionHalted,
        Self::SubscriptionCancelled,
        Self::SubscriptionCompleted,
        Self::SubscriptionExpired,
        Self::SubscriptionPaused,
        Self::SubscriptionResumed,
        Self::SubscriptionUpdated,
        Self::PaymentAuthorized,
        Self::PaymentFailed,
    ];

    /// Parses the envelope's `event` string. Unknown kinds return `None`.
    pub fn parse(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == event)
    }

    /// Wire name, e.g. `subscription.activated`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionAuthenticated => "subscription.authenticated",
            Self::SubscriptionActivated => "subscription.activated",
            Self::SubscriptionCharged => "subscription.charged",
            Self::SubscriptionPending => "subscription.pending",
            Self::SubscriptionHalted => "subscription.halted",
            Self::SubscriptionCancelled => "subscription.cancelled",
            Self::SubscriptionCompleted => "subscription.completed",
            Self::SubscriptionExpired => "subscription.expired",
            Self::SubscriptionPaused => "subscription.paused",
            Self::SubscriptionResumed => "subscription.resumed",
            Self::SubscriptionUpdated => "subscription.updated",
            Self::PaymentAuthorized => "payment.authorized",
            Self::PaymentFailed => "payment.failed",
        }
    }

    pub fn is_payment_event(&self) -> bool {
        matches!(self, Self::PaymentAuthorized | Self::PaymentFailed)
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level webhook body: `{event, payload: {subscription?, payment?}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl WebhookEnvelope {
    /// Parses the raw body. Nested entities are not validated here.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    pub fn event_type(&self) -> Option<WebhookEventType> {
        WebhookEventType::parse(&self.event)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub subscription: Option<EntityWrapper>,
    #[serde(default)]
    pub payment: Option<EntityWrapper>,
}

/// Razorpay wraps every entity as `{"entity": {...}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityWrapper {
    #[serde(default)]
    pub entity: Value,
}

impl WebhookPayload {
    /// `payload.payment.entity.id`, if present.
    pub fn payment_id(&self) -> Option<&str> {
        entity_id(self.payment.as_ref())
    }

    /// `payload.subscription.entity.id`, if present.
    pub fn subscription_id(&self) -> Option<&str> {
        entity_id(self.subscription.as_ref())
    }

    fn subscription_entity(&self) -> Result<SubscriptionEntity, WebhookError> {
        decode_entity(self.subscription.as_ref(), "payload.subscription.entity")
    }

    fn payment_entity(&self) -> Result<RawPayment, WebhookError> {
        decode_entity(self.payment.as_ref(), "payload.payment.entity")
    }

    fn optional_payment_entity(&self) -> Result<Option<RawPayment>, WebhookError> {
        match self.payment.as_ref() {
            Some(wrapper) if !wrapper.entity.is_null() => self.payment_entity().map(Some),
            _ => Ok(None),
        }
    }
}

fn entity_id(wrapper: Option<&EntityWrapper>) -> Option<&str> {
    wrapper?
        .entity
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn decode_entity<T: serde::de::DeserializeOwned>(
    wrapper: Option<&EntityWrapper>,
    field: &'static str,
) -> Result<T, WebhookError> {
    let entity = match wrapper {
        Some(wrapper) if !wrapper.entity.is_null() => &wrapper.entity,
        _ => return Err(WebhookError::MissingField(field)),
    };
    T::deserialize(entity).map_err(|e| WebhookError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

/// Subscription entity from `payload.subscription.entity`. Times are Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubscriptionEntity {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub current_start: Option<i64>,
    #[serde(default)]
    pub current_end: Option<i64>,
    #[serde(default)]
    pub ended_at: Option<i64>,
    #[serde(default)]
    pub charge_at: Option<i64>,
    #[serde(default)]
    pub start_at: Option<i64>,
    #[serde(default)]
    pub end_at: Option<i64>,
    #[serde(default)]
    pub paid_count: Option<u32>,
    #[serde(default)]
    pub remaining_count: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u32>,
}

impl SubscriptionEntity {
    fn external_id(&self) -> Result<ExternalSubscriptionId, WebhookError> {
        ExternalSubscriptionId::new(self.id.clone())
            .map_err(|_| WebhookError::MissingField("payload.subscription.entity.id"))
    }
}

/// A handled webhook, lifted into its typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    Authenticated(SubscriptionEntity),
    Activated(SubscriptionEntity),
    Charged {
        subscription: SubscriptionEntity,
        payment: Option<RawPayment>,
    },
    Pending(SubscriptionEntity),
    Halted(SubscriptionEntity),
    Cancelled(SubscriptionEntity),
    Completed(SubscriptionEntity),
    Expired(SubscriptionEntity),
    Paused(SubscriptionEntity),
    Resumed(SubscriptionEntity),
    Updated(SubscriptionEntity),
    PaymentAuthorized {
        subscription_id: ExternalSubscriptionId,
        payment: RawPayment,
    },
    PaymentFailed {
        subscription_id: ExternalSubscriptionId,
        payment: RawPayment,
    },
}

impl SubscriptionEvent {
    /// Builds the typed event for `kind` from the envelope payload.
    ///
    /// # Errors
    ///
    /// - `MissingField` - required entity absent
    /// - `InvalidField` - entity present but malformed
    /// - `Unlinked` - payment event with no subscription reference
    pub fn from_payload(
        kind: WebhookEventType,
        payload: &WebhookPayload,
    ) -> Result<Self, WebhookError> {
        use WebhookEventType as K;

        let event = match kind {
            K::SubscriptionAuthenticated => Self::Authenticated(payload.subscription_entity()?),
            K::SubscriptionActivated => Self::Activated(payload.subscription_entity()?),
            K::SubscriptionCharged => Self::Charged {
                subscription: payload.subscription_entity()?,
                payment: payload.optional_payment_entity()?,
            },
            K::SubscriptionPending => Self::Pending(payload.subscription_entity()?),
            K::SubscriptionHalted => Self::Halted(payload.subscription_entity()?),
            K::SubscriptionCancelled => Self::Cancelled(payload.subscription_entity()?),
            K::SubscriptionCompleted => Self::Completed(payload.subscription_entity()?),
            K::SubscriptionExpired => Self::Expired(payload.subscription_entity()?),
            K::SubscriptionPaused => Self::Paused(payload.subscription_entity()?),
            K::SubscriptionResumed => Self::Resumed(payload.subscription_entity()?),
            K::SubscriptionUpdated => Self::Updated(payload.subscription_entity()?),
            K::PaymentAuthorized | K::PaymentFailed => {
                let payment = payload.payment_entity()?;
                let subscription_id = linked_subscription(&payment, payload)?;
                if kind == K::PaymentAuthorized {
                    Self::PaymentAuthorized {
                        subscription_id,
                        payment,
                    }
                } else {
                    Self::PaymentFailed {
                        subscription_id,
                        payment,
                    }
                }
            }
        };

        // Reject blank ids up front so lookups never run on them.
        event.external_subscription_id()?;
        Ok(event)
    }

    pub fn event_type(&self) -> WebhookEventType {
        use WebhookEventType as K;
        match self {
            Self::Authenticated(_) => K::SubscriptionAuthenticated,
            Self::Activated(_) => K::SubscriptionActivated,
            Self::Charged { .. } => K::SubscriptionCharged,
            Self::Pending(_) => K::SubscriptionPending,
            Self::Halted(_) => K::SubscriptionHalted,
            Self::Cancelled(_) => K::SubscriptionCancelled,
            Self::Completed(_) => K::SubscriptionCompleted,
            Self::Expired(_) => K::SubscriptionExpired,
            Self::Paused(_) => K::SubscriptionPaused,
            Self::Resumed(_) => K::SubscriptionResumed,
            Self::Updated(_) => K::SubscriptionUpdated,
            Self::PaymentAuthorized { .. } => K::PaymentAuthorized,
            Self::PaymentFailed { .. } => K::PaymentFailed,
        }
    }

    /// Processor subscription id the event refers to.
    pub fn external_subscription_id(&self) -> Result<ExternalSubscriptionId, WebhookError> {
        match self {
            Self::Authenticated(s)
            | Self::Activated(s)
            | Self::Charged { subscription: s, .. }
            | Self::Pending(s)
            | Self::Halted(s)
            | Self::Cancelled(s)
            | Self::Completed(s)
            | Self::Expired(s)
            | Self::Paused(s)
            | Self::Resumed(s)
            | Self::Updated(s) => s.external_id(),
            Self::PaymentAuthorized {
                subscription_id, ..
            }
            | Self::PaymentFailed {
                subscription_id, ..
            } => Ok(subscription_id.clone()),
        }
    }
}

/// Payment → subscription correlation: the payment's own reference first,
/// then the sibling subscription entity.
fn linked_subscription(
    payment: &RawPayment,
    payload: &WebhookPayload,
) -> Result<ExternalSubscriptionId, WebhookError> {
    payment
        .subscription_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| payload.subscription_id())
        .and_then(|id| ExternalSubscriptionId::new(id).ok())
        .ok_or_else(|| WebhookError::Unlinked(payment.id.clone()))
}
