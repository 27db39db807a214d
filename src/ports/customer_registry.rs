//! Customer registry port.
//!
//! The processor offers no lookup by email or contact, so callers scan the
//! most recent records and filter locally.

use async_trait::async_trait;

use super::processor_error::ProcessorError;
use crate::domain::customer::{CustomerData, CustomerIdentity};

/// Port for the processor's customer registry.
#[async_trait]
pub trait CustomerRegistry: Send + Sync {
    /// Up to `limit` most recently created customers, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<CustomerIdentity>, ProcessorError>;

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` when the processor already has this identity
    async fn create(&self, data: &CustomerData) -> Result<CustomerIdentity, ProcessorError>;

    /// Overwrite name, email, contact and notes of an existing customer.
    async fn edit(
        &self,
        customer_id: &str,
        data: &CustomerData,
    ) -> Result<CustomerIdentity, ProcessorError>;
}
