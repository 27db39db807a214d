//! Subscription gateway port for outbound subscription management.
//!
//! Used by the checkout and account-management collaborators. Local state is
//! never changed here; the processor reports the outcome back via webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::processor_error::ProcessorError;
use crate::domain::customer::CustomerNotes;

/// Port for processor-side subscription lifecycle operations.
#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, ProcessorError>;

    /// Returns `None` if the processor has no such subscription.
    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<GatewaySubscription>, ProcessorError>;

    /// Cancel a subscription.
    ///
    /// If `at_cycle_end` is true, the subscription stays active until the
    /// current billing cycle ends.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> Result<GatewaySubscription, ProcessorError>;

    async fn pause_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, ProcessorError>;

    async fn resume_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, ProcessorError>;
}

/// Request to create a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Processor plan id (`plan_...`).
    pub plan_id: String,

    /// Number of billing cycles.
    pub total_count: u32,

    /// Processor customer id, if already resolved.
    pub customer_id: Option<String>,

    /// First charge time (Unix seconds); immediate when absent.
    pub start_at: Option<i64>,

    /// Whether the processor should notify the customer.
    pub customer_notify: bool,

    #[serde(default)]
    pub notes: CustomerNotes,
}

/// Subscription as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub plan_id: String,
    pub customer_id: Option<String>,
    /// Processor status string (`created`, `authenticated`, `active`, ...).
    pub status: String,
    pub current_start: Option<i64>,
    pub current_end: Option<i64>,
    pub charge_at: Option<i64>,
    pub paid_count: u32,
    pub remaining_count: Option<u32>,
    /// Hosted authorization link for the customer.
    pub short_url: Option<String>,
}
