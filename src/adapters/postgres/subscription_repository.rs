//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Provides persistent storage for Subscription aggregates. The payment
//! method and the webhook audit log are stored as JSONB.

use crate::domain::foundation::{
    DomainError, ErrorCode, ExternalSubscriptionId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::payment::PaymentMethod;
use crate::domain::subscription::{
    Subscription, SubscriptionSnapshot, SubscriptionStatus, WebhookLogEntry,
};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    external_subscription_id: String,
    user_id: String,
    status: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    next_billing_date: Option<DateTime<Utc>>,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    paid_count: i32,
    remaining_count: i32,
    payment_method: Option<serde_json::Value>,
    webhook_events: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status: SubscriptionStatus = row.status.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;

        let payment_method = row
            .payment_method
            .map(serde_json::from_value::<PaymentMethod>)
            .transpose()
            .map_err(|e| corrupt("payment_method", e))?;

        let webhook_events: Vec<WebhookLogEntry> =
            serde_json::from_value(row.webhook_events).map_err(|e| corrupt("webhook_events", e))?;

        Ok(Subscription::from_snapshot(SubscriptionSnapshot {
            id: SubscriptionId::from_uuid(row.id),
            external_subscription_id: ExternalSubscriptionId::new(row.external_subscription_id)
                .map_err(|e| corrupt("external_subscription_id", e))?,
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            status,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: row.end_date.map(Timestamp::from_datetime),
            next_billing_date: row.next_billing_date.map(Timestamp::from_datetime),
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            paid_count: count_from_db(row.paid_count),
            remaining_count: count_from_db(row.remaining_count),
            payment_method,
            webhook_events,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: u64::try_from(row.version).map_err(|e| corrupt("version", e))?,
        }))
    }
}

fn corrupt(column: &str, error: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, error),
    )
}

fn count_from_db(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn count_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalSubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, external_subscription_id, user_id, status, start_date, end_date,
                   next_billing_date, current_period_start, current_period_end,
                   paid_count, remaining_count, payment_method, webhook_events,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE external_subscription_id = $1
            "#,
        )
        .bind(external_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let expected = i64::try_from(subscription.version()).map_err(|e| corrupt("version", e))?;

        // A version mismatch makes the conflict branch update nothing.
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, external_subscription_id, user_id, status, start_date, end_date,
                next_billing_date, current_period_start, current_period_end,
                paid_count, remaining_count, payment_method, webhook_events,
                created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16 + 1)
            ON CONFLICT (external_subscription_id) DO UPDATE SET
                status = EXCLUDED.status,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                next_billing_date = EXCLUDED.next_billing_date,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                paid_count = EXCLUDED.paid_count,
                remaining_count = EXCLUDED.remaining_count,
                payment_method = EXCLUDED.payment_method,
                webhook_events = EXCLUDED.webhook_events,
                updated_at = EXCLUDED.updated_at,
                version = subscriptions.version + 1
            WHERE subscriptions.version = $16
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.external_subscription_id.as_str())
        .bind(subscription.user_id.as_str())
        .bind(subscription.status().as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_ref().map(Timestamp::as_datetime))
        .bind(subscription.next_billing_date.as_ref().map(Timestamp::as_datetime))
        .bind(subscription.current_period_start.as_ref().map(Timestamp::as_datetime))
        .bind(subscription.current_period_end.as_ref().map(Timestamp::as_datetime))
        .bind(count_to_db(subscription.paid_count))
        .bind(count_to_db(subscription.remaining_count))
        .bind(subscription.payment_method.as_ref().map(Json))
        .bind(Json(subscription.webhook_events()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::concurrent_modification(format!(
                "subscription {} changed since version {}",
                subscription.external_subscription_id, expected
            )));
        }

        Ok(())
    }
}
