//! In-memory replay store.
//!
//! Process-local: a redelivery that lands on another instance is not seen
//! as a duplicate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{ReplayStore, ReplayStoreError};

/// HashMap-backed replay store. `sweep` is a linear scan.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReplayStore {
    entries: Arc<RwLock<HashMap<String, Timestamp>>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ReplayStore for InMemoryReplayStore {
    async fn get(&self, event_id: &str) -> Result<Option<Timestamp>, ReplayStoreError> {
        Ok(self.entries.read().await.get(event_id).copied())
    }

    async fn set(&self, event_id: &str, seen_at: Timestamp) -> Result<(), ReplayStoreError> {
        self.entries
            .write()
            .await
            .insert(event_id.to_string(), seen_at);
        Ok(())
    }

    async fn sweep(&self, cutoff: Timestamp) -> Result<u64, ReplayStoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, seen_at| !seen_at.is_before(&cutoff));
        Ok((before - entries.len()) as u64)
    }

    async fn claim(&self, event_id: &str, seen_at: Timestamp) -> Result<bool, ReplayStoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(event_id) {
            return Ok(false);
        }
        entries.insert(event_id.to_string(), seen_at);
        Ok(true)
    }
}
