//! Subscription repository port.
//!
//! Defines the contract for loading and persisting Subscription aggregates.
//! Records are created by the checkout flow, so webhook processing only ever
//! looks up by processor id and saves back.

use crate::domain::foundation::{DomainError, ExternalSubscriptionId};
use crate::domain::subscription::Subscription;
use async_trait::async_trait;

/// Repository port for Subscription aggregate persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by the processor's subscription id.
    ///
    /// Returns `None` if no local record exists.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalSubscriptionId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Insert or update a subscription.
    ///
    /// The write only lands if the stored revision still equals
    /// `subscription.version()`; the stored copy then carries `version + 1`.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the record was saved by someone else
    ///   since it was loaded
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;
}
