//! In-Memory Subscription Repository
//!
//! Keeps subscriptions in a map keyed by processor id.
//! Useful for testing and for running without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ExternalSubscriptionId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<ExternalSubscriptionId, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a repository with existing records.
    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let map = subscriptions
            .into_iter()
            .map(|s| (s.external_subscription_id.clone(), s))
            .collect();
        Self {
            subscriptions: Arc::new(RwLock::new(map)),
        }
    }

    /// Current stored copy, if any.
    pub async fn get(&self, external_id: &ExternalSubscriptionId) -> Option<Subscription> {
        self.subscriptions.read().await.get(external_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalSubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self.get(external_id).await)
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        let key = &subscription.external_subscription_id;

        if let Some(stored) = subscriptions.get(key) {
            if stored.version() != subscription.version() {
                return Err(DomainError::concurrent_modification(format!(
                    "subscription {} is at version {}, save was based on {}",
                    key,
                    stored.version(),
                    subscription.version()
                )));
            }
        }

        subscriptions.insert(key.clone(), subscription.saved());
        Ok(())
    }
}
