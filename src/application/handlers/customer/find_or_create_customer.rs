//! CustomerIdentityResolver - idempotent lookup-or-create against the
//! processor's customer registry.
//!
//! The registry has no search endpoint, so the most recent records are
//! scanned and filtered on email or contact. Concurrent first-time calls may
//! both reach `create`; the loser sees `DuplicateCustomer` and re-searches.

use std::sync::Arc;

use crate::domain::customer::{CustomerData, CustomerIdentity};
use crate::domain::foundation::ValidationError;
use crate::ports::{CustomerRegistry, ProcessorError};

/// Number of recent customers scanned per search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveCustomerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Processor(#[from] ProcessorError),
}

pub struct CustomerIdentityResolver {
    registry: Arc<dyn CustomerRegistry>,
    search_limit: u32,
}

impl CustomerIdentityResolver {
    pub fn new(registry: Arc<dyn CustomerRegistry>) -> Self {
        Self {
            registry,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub async fn find_or_create(
        &self,
        data: &CustomerData,
    ) -> Result<CustomerIdentity, ResolveCustomerError> {
        data.validate()?;

        if let Some(existing) = self.search(data).await? {
            return Ok(self.refresh(existing, data).await);
        }

        match self.registry.create(data).await {
            Ok(created) => {
                tracing::info!(customer_id = %created.id, "Customer created");
                Ok(created)
            }
            Err(e) if e.is_duplicate_customer() => {
                tracing::info!("Customer created concurrently, searching again");
                match self.search(data).await? {
                    Some(existing) => Ok(existing),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search(&self, data: &CustomerData) -> Result<Option<CustomerIdentity>, ProcessorError> {
        let recent = self.registry.list_recent(self.search_limit).await?;
        Ok(recent.into_iter().find(|c| c.matches(data)))
    }

    /// Edit failures fall back to the stored record.
    async fn refresh(&self, existing: CustomerIdentity, data: &CustomerData) -> CustomerIdentity {
        if !existing.differs_from(data) {
            return existing;
        }

        match self.registry.edit(&existing.id, data).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(
                    customer_id = %existing.id,
                    error = %e,
                    "Customer update failed, using existing record"
                );
                existing
            }
        }
    }
}
