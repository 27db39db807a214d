//! WebhookEventRouter - dispatches an admitted webhook to its lifecycle handler.
//!
//! Every outcome is acknowledged to the processor. Failures inside a handler
//! (bad nested payload, unknown subscription, storage errors) are logged and
//! reported back as `RouteOutcome::Skipped`, never as an error.

use std::sync::Arc;

use crate::domain::foundation::{ExternalSubscriptionId, Timestamp};
use crate::domain::subscription::{apply_event, SubscriptionStatus};
use crate::domain::webhook::{
    SubscriptionEvent, WebhookEnvelope, WebhookError, WebhookEventType,
};
use crate::ports::{SubscriptionRepository, UserCacheInvalidator};

/// Loads of a subscription per delivery when concurrent saves collide.
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

/// What the router did with a delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Handler ran and the subscription was saved.
    Applied {
        event_type: WebhookEventType,
        subscription_id: ExternalSubscriptionId,
        status: SubscriptionStatus,
        status_changed: bool,
    },
    /// Event string not in the handled set.
    Ignored { event: String },
    /// Handler failed; delivery is still acknowledged.
    Skipped {
        event_type: WebhookEventType,
        error: WebhookError,
    },
}

impl RouteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RouteOutcome::Applied { .. })
    }
}

pub struct WebhookEventRouter {
    repository: Arc<dyn SubscriptionRepository>,
    user_cache: Arc<dyn UserCacheInvalidator>,
}

impl WebhookEventRouter {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        user_cache: Arc<dyn UserCacheInvalidator>,
    ) -> Self {
        Self {
            repository,
            user_cache,
        }
    }

    pub async fn route(&self, envelope: &WebhookEnvelope, now: Timestamp) -> RouteOutcome {
        let Some(event_type) = envelope.event_type() else {
            tracing::info!(event = %envelope.event, "Unhandled webhook event acknowledged");
            return RouteOutcome::Ignored {
                event: envelope.event.clone(),
            };
        };

        match self.handle(event_type, envelope, now).await {
            Ok(outcome) => outcome,
            Err(error) => {
                log_skipped(event_type, &error);
                RouteOutcome::Skipped { event_type, error }
            }
        }
    }

    async fn handle(
        &self,
        event_type: WebhookEventType,
        envelope: &WebhookEnvelope,
        now: Timestamp,
    ) -> Result<RouteOutcome, WebhookError> {
        let event = SubscriptionEvent::from_payload(event_type, &envelope.payload)?;
        let external_id = event.external_subscription_id()?;

        let mut attempt = 1;
        let (subscription, previous, status_changed) = loop {
            let mut subscription = self
                .repository
                .find_by_external_id(&external_id)
                .await
                .map_err(|e| WebhookError::Database(e.to_string()))?
                .ok_or_else(|| WebhookError::SubscriptionNotFound(external_id.to_string()))?;

            let previous = subscription.status();
            let status_changed = apply_event(&mut subscription, &event, now);

            match self.repository.save(&subscription).await {
                Ok(()) => break (subscription, previous, status_changed),
                Err(e) if e.is_concurrent_modification() && attempt < MAX_SAVE_ATTEMPTS => {
                    tracing::debug!(
                        event_type = %event_type,
                        subscription_id = %external_id,
                        attempt,
                        "Subscription changed concurrently, reapplying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(WebhookError::Database(e.to_string())),
            }
        };

        tracing::info!(
            event_type = %event_type,
            subscription_id = %external_id,
            previous_status = %previous,
            status = %subscription.status(),
            status_changed,
            "Webhook applied"
        );

        // Saved state is authoritative; a stale cache entry expires on its own.
        if let Err(e) = self.user_cache.invalidate_user(&subscription.user_id).await {
            tracing::warn!(
                user_id = %subscription.user_id,
                error = %e,
                "User cache invalidation failed"
            );
        }

        Ok(RouteOutcome::Applied {
            event_type,
            subscription_id: external_id,
            status: subscription.status(),
            status_changed,
        })
    }
}

fn log_skipped(event_type: WebhookEventType, error: &WebhookError) {
    match error {
        WebhookError::SubscriptionNotFound(id) => {
            tracing::warn!(event_type = %event_type, subscription_id = %id, "Subscription not found for webhook");
        }
        WebhookError::Unlinked(payment_id) => {
            tracing::info!(event_type = %event_type, payment_id = %payment_id, "Payment not linked to a subscription");
        }
        WebhookError::Database(_) | WebhookError::StorageError(_) => {
            tracing::error!(event_type = %event_type, error = %error, "Webhook handler failed");
        }
        _ => {
            tracing::warn!(event_type = %event_type, error = %error, "Webhook payload rejected by handler");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::RecordingUserCache;
    use crate::adapters::storage::InMemorySubscriptionRepository;
    use crate::domain::foundation::{DomainError, UserId};
    use crate::domain::subscription::Subscription;
    use crate::ports::{CacheError, UserCacheInvalidator};
    use async_trait::async_trait;
    use serde_json::json;

    fn subscription(status: SubscriptionStatus) -> Subscription {
        Subscription::create(
            ExternalSubscriptionId::new("sub_1").unwrap(),
            UserId::new("user-1").unwrap(),
            status,
            Timestamp::from_unix_secs(1_690_000_000).unwrap(),
        )
    }

    fn envelope(value: serde_json::Value) -> WebhookEnvelope {
        WebhookEnvelope::parse(value.to_string().as_bytes()).unwrap()
    }

    fn router_with(
        repo: &InMemorySubscriptionRepository,
        cache: &RecordingUserCache,
    ) -> WebhookEventRouter {
        WebhookEventRouter::new(Arc::new(repo.clone()), Arc::new(cache.clone()))
    }

    fn ext_id() -> ExternalSubscriptionId {
        ExternalSubscriptionId::new("sub_1").unwrap()
    }

    #[tokio::test]
    async fn activation_is_saved_and_cache_invalidated() {
        let repo = InMemorySubscriptionRepository::with_subscriptions([subscription(
            SubscriptionStatus::Authenticated,
        )]);
        let cache = RecordingUserCache::new();
        let router = router_with(&repo, &cache);

        let outcome = router
            .route(
                &envelope(json!({
                    "event": "subscription.activated",
                    "payload": {"subscription": {"entity": {
                        "id": "sub_1",
                        "start_at": 1_700_000_000,
                        "charge_at": 1_702_600_000,
                        "paid_count": 0,
                        "remaining_count": 12
                    }}}
                })),
                Timestamp::now(),
            )
            .await;

        assert_eq!(
            outcome,
            RouteOutcome::Applied {
                event_type: WebhookEventType::SubscriptionActivated,
                subscription_id: ext_id(),
                status: SubscriptionStatus::Active,
                status_changed: true,
            }
        );

        let saved = repo.get(&ext_id()).await.unwrap();
        assert_eq!(saved.status(), SubscriptionStatus::Active);
        assert_eq!(saved.remaining_count, 12);
        assert_eq!(cache.invalidated().await, vec![UserId::new("user-1").unwrap()]);
    }

    #[tokio::test]
    async fn unknown_event_is_ignored() {
        let repo = InMemorySubscriptionRepository::new();
        let cache = RecordingUserCache::new();

        let outcome = router_with(&repo, &cache)
            .route(
                &envelope(json!({"event": "invoice.paid", "payload": {}})),
                Timestamp::now(),
            )
            .await;

        assert_eq!(
            outcome,
            RouteOutcome::Ignored {
                event: "invoice.paid".into()
            }
        );
        assert!(cache.invalidated().await.is_empty());
    }

    #[tokio::test]
    async fn missing_subscription_is_skipped() {
        let repo = InMemorySubscriptionRepository::new();
        let cache = RecordingUserCache::new();

        let outcome = router_with(&repo, &cache)
            .route(
                &envelope(json!({
                    "event": "subscription.halted",
                    "payload": {"subscription": {"entity": {"id": "sub_unknown"}}}
                })),
                Timestamp::now(),
            )
            .await;

        assert_eq!(
            outcome,
            RouteOutcome::Skipped {
                event_type: WebhookEventType::SubscriptionHalted,
                error: WebhookError::SubscriptionNotFound("sub_unknown".into()),
            }
        );
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn missing_entity_is_skipped_without_touching_storage() {
        let repo = InMemorySubscriptionRepository::with_subscriptions([subscription(
            SubscriptionStatus::Active,
        )]);
        let cache = RecordingUserCache::new();

        let outcome = router_with(&repo, &cache)
            .route(
                &envelope(json!({"event": "subscription.paused", "payload": {}})),
                Timestamp::now(),
            )
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Skipped {
                error: WebhookError::MissingField(_),
                ..
            }
        ));
        let stored = repo.get(&ext_id()).await.unwrap();
        assert_eq!(stored.status(), SubscriptionStatus::Active);
        assert!(stored.webhook_events().is_empty());
    }

    #[tokio::test]
    async fn unlinked_payment_is_skipped() {
        let repo = InMemorySubscriptionRepository::new();
        let cache = RecordingUserCache::new();

        let outcome = router_with(&repo, &cache)
            .route(
                &envelope(json!({
                    "event": "payment.failed",
                    "payload": {"payment": {"entity": {"id": "pay_1", "amount": 100}}}
                })),
                Timestamp::now(),
            )
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Skipped {
                error: WebhookError::Unlinked(ref id),
                ..
            } if id == "pay_1"
        ));
    }

    #[tokio::test]
    async fn first_charge_does_not_activate() {
        let repo = InMemorySubscriptionRepository::with_subscriptions([subscription(
            SubscriptionStatus::Authenticated,
        )]);
        let cache = RecordingUserCache::new();

        let outcome = router_with(&repo, &cache)
            .route(
                &envelope(json!({
                    "event": "subscription.charged",
                    "payload": {
                        "subscription": {"entity": {"id": "sub_1", "paid_count": 1, "remaining_count": 11}},
                        "payment": {"entity": {
                            "id": "pay_mandate",
                            "amount": 100,
                            "currency": "INR",
                            "status": "captured",
                            "method": "upi",
                            "vpa": "asha@okbank"
                        }}
                    }
                })),
                Timestamp::now(),
            )
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Applied {
                status: SubscriptionStatus::Authenticated,
                status_changed: false,
                ..
            }
        ));
        let stored = repo.get(&ext_id()).await.unwrap();
        assert_eq!(stored.paid_count, 1);
        assert!(stored.payment_method.is_some());
    }

    struct FailingCache;

    #[async_trait]
    impl UserCacheInvalidator for FailingCache {
        async fn invalidate_user(&self, _user_id: &UserId) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn cache_failure_does_not_undo_the_save() {
        let repo = InMemorySubscriptionRepository::with_subscriptions([subscription(
            SubscriptionStatus::Active,
        )]);
        let router = WebhookEventRouter::new(Arc::new(repo.clone()), Arc::new(FailingCache));

        let outcome = router
            .route(
                &envelope(json!({
                    "event": "subscription.halted",
                    "payload": {"subscription": {"entity": {"id": "sub_1"}}}
                })),
                Timestamp::now(),
            )
            .await;

        assert!(outcome.is_applied());
        let stored = repo.get(&ext_id()).await.unwrap();
        assert_eq!(stored.status(), SubscriptionStatus::Halted);
    }

    struct FailingRepository;

    #[async_trait]
    impl SubscriptionRepository for FailingRepository {
        async fn find_by_external_id(
            &self,
            _external_id: &ExternalSubscriptionId,
        ) -> Result<Option<Subscription>, DomainError> {
            Err(DomainError::database("pool timed out"))
        }

        async fn save(&self, _subscription: &Subscription) -> Result<(), DomainError> {
            Err(DomainError::database("pool timed out"))
        }
    }

    #[tokio::test]
    async fn repository_failure_is_skipped_not_raised() {
        let router = WebhookEventRouter::new(
            Arc::new(FailingRepository),
            Arc::new(RecordingUserCache::new()),
        );

        let outcome = router
            .route(
                &envelope(json!({
                    "event": "subscription.halted",
                    "payload": {"subscription": {"entity": {"id": "sub_1"}}}
                })),
                Timestamp::now(),
            )
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Skipped {
                error: WebhookError::Database(_),
                ..
            }
        ));
    }

    /// Holds the first `gated` loads at a barrier so they read the same revision.
    struct GatedRepository {
        inner: InMemorySubscriptionRepository,
        barrier: tokio::sync::Barrier,
        gated: usize,
        loads: std::sync::atomic::AtomicUsize,
    }

    impl GatedRepository {
        fn new(inner: InMemorySubscriptionRepository, gated: usize) -> Self {
            Self {
                inner,
                barrier: tokio::sync::Barrier::new(gated),
                gated,
                loads: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubscriptionRepository for GatedRepository {
        async fn find_by_external_id(
            &self,
            external_id: &ExternalSubscriptionId,
        ) -> Result<Option<Subscription>, DomainError> {
            let found = self.inner.find_by_external_id(external_id).await;
            let load = self
                .loads
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if load < self.gated {
                self.barrier.wait().await;
            }
            found
        }

        async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
            self.inner.save(subscription).await
        }
    }

    #[tokio::test]
    async fn concurrent_deliveries_both_land() {
        let repo = InMemorySubscriptionRepository::with_subscriptions([subscription(
            SubscriptionStatus::Authenticated,
        )]);
        let router = WebhookEventRouter::new(
            Arc::new(GatedRepository::new(repo.clone(), 2)),
            Arc::new(RecordingUserCache::new()),
        );

        let activated = envelope(json!({
            "event": "subscription.activated",
            "payload": {"subscription": {"entity": {"id": "sub_1"}}}
        }));
        let charged = envelope(json!({
            "event": "subscription.charged",
            "payload": {
                "subscription": {"entity": {"id": "sub_1", "paid_count": 1}},
                "payment": {"entity": {"id": "pay_1", "amount": 49_900, "method": "card"}}
            }
        }));

        let (first, second) = tokio::join!(
            router.route(&activated, Timestamp::now()),
            router.route(&charged, Timestamp::now())
        );

        assert!(first.is_applied());
        assert!(second.is_applied());

        let stored = repo.get(&ext_id()).await.unwrap();
        assert_eq!(stored.status(), SubscriptionStatus::Active);
        assert_eq!(stored.paid_count, 1);
        assert_eq!(stored.version(), 2);

        let mut kinds: Vec<_> = stored.webhook_events().iter().map(|e| e.event_type).collect();
        kinds.sort_by_key(|k| k.as_str());
        assert_eq!(
            kinds,
            vec![
                WebhookEventType::SubscriptionActivated,
                WebhookEventType::SubscriptionCharged
            ]
        );
    }

    struct AlwaysStaleRepository {
        inner: InMemorySubscriptionRepository,
        saves: std::sync::atomic::AtomicU32,
    }

    #[async_trait]
    impl SubscriptionRepository for AlwaysStaleRepository {
        async fn find_by_external_id(
            &self,
            external_id: &ExternalSubscriptionId,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_by_external_id(external_id).await
        }

        async fn save(&self, _subscription: &Subscription) -> Result<(), DomainError> {
            self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(DomainError::concurrent_modification("sub_1 moved on"))
        }
    }

    #[tokio::test]
    async fn persistent_conflict_gives_up_after_bounded_attempts() {
        let repo = Arc::new(AlwaysStaleRepository {
            inner: InMemorySubscriptionRepository::with_subscriptions([subscription(
                SubscriptionStatus::Active,
            )]),
            saves: std::sync::atomic::AtomicU32::new(0),
        });
        let router = WebhookEventRouter::new(repo.clone(), Arc::new(RecordingUserCache::new()));

        let outcome = router
            .route(
                &envelope(json!({
                    "event": "subscription.halted",
                    "payload": {"subscription": {"entity": {"id": "sub_1"}}}
                })),
                Timestamp::now(),
            )
            .await;

        assert!(matches!(
            outcome,
            RouteOutcome::Skipped {
                error: WebhookError::Database(_),
                ..
            }
        ));
        assert_eq!(
            repo.saves.load(std::sync::atomic::Ordering::SeqCst),
            MAX_SAVE_ATTEMPTS
        );
    }
}
