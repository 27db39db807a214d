//! ReplayStore port - remembers recently seen webhook event ids.
//!
//! Entries map an event id to the time it was first seen. Ids older than the
//! replay window are swept before each lookup, so a redelivery after the
//! window has passed is processed again.

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;

/// Errors from the replay store backend.
#[derive(Debug, thiserror::Error)]
pub enum ReplayStoreError {
    #[error("replay store unavailable: {0}")]
    Unavailable(String),
}

/// Port for replay detection state.
#[async_trait]
pub trait ReplayStore: Send + Sync {
    /// Time the event id was first seen, if still remembered.
    async fn get(&self, event_id: &str) -> Result<Option<Timestamp>, ReplayStoreError>;

    /// Remember `event_id` as seen at `seen_at`.
    async fn set(&self, event_id: &str, seen_at: Timestamp) -> Result<(), ReplayStoreError>;

    /// Forget every entry seen before `cutoff`. Returns how many were removed.
    async fn sweep(&self, cutoff: Timestamp) -> Result<u64, ReplayStoreError>;

    /// Records `event_id` unless already present. Returns true if this call recorded it.
    ///
    /// The default is a get-then-set and is not atomic; backends that can do
    /// better override it.
    async fn claim(&self, event_id: &str, seen_at: Timestamp) -> Result<bool, ReplayStoreError> {
        if self.get(event_id).await?.is_some() {
            return Ok(false);
        }
        self.set(event_id, seen_at).await?;
        Ok(true)
    }
}
