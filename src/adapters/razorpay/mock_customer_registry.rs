//! Mock customer registry for testing.
//!
//! Behaves like the processor: `create` refuses an identity that matches an
//! existing record with `DuplicateCustomer`. Supports:
//! - Seeded customers
//! - Error injection for `edit`
//! - A creation barrier to line up concurrent callers
//! - Call counting

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use crate::domain::customer::{CustomerData, CustomerIdentity};
use crate::ports::{CustomerRegistry, ProcessorError};

#[derive(Clone, Default)]
pub struct MockCustomerRegistry {
    inner: Arc<Mutex<MockState>>,
    create_barrier: Option<Arc<Barrier>>,
}

#[derive(Default)]
struct MockState {
    /// Oldest first; `list_recent` reverses.
    customers: Vec<CustomerIdentity>,
    next_id: u32,
    edit_error: Option<ProcessorError>,
    list_calls: u32,
    create_calls: u32,
    edit_calls: u32,
}

/// Call counts for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCalls {
    pub list: u32,
    pub create: u32,
    pub edit: u32,
}

impl MockCustomerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: impl IntoIterator<Item = CustomerIdentity>) -> Self {
        let registry = Self::default();
        if let Ok(mut state) = registry.inner.lock() {
            state.customers.extend(customers);
        }
        registry
    }

    /// Every `create` waits on `barrier` before touching state.
    pub fn with_create_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.create_barrier = Some(barrier);
        self
    }

    pub fn fail_edits_with(&self, error: ProcessorError) {
        self.state().edit_error = Some(error);
    }

    pub fn customers(&self) -> Vec<CustomerIdentity> {
        self.state().customers.clone()
    }

    pub fn calls(&self) -> RegistryCalls {
        let state = self.state();
        RegistryCalls {
            list: state.list_calls,
            create: state.create_calls,
            edit: state.edit_calls,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CustomerRegistry for MockCustomerRegistry {
    async fn list_recent(&self, limit: u32) -> Result<Vec<CustomerIdentity>, ProcessorError> {
        let mut state = self.state();
        state.list_calls += 1;
        Ok(state
            .customers
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CustomerData) -> Result<CustomerIdentity, ProcessorError> {
        if let Some(barrier) = &self.create_barrier {
            barrier.wait().await;
        }

        let mut state = self.state();
        state.create_calls += 1;

        if state.customers.iter().any(|c| c.matches(data)) {
            return Err(ProcessorError::duplicate_customer(
                "Customer already exists for the merchant",
            ));
        }

        state.next_id += 1;
        let customer = CustomerIdentity {
            id: format!("cust_mock{:04}", state.next_id),
            name: data.name.clone(),
            email: data.email.clone(),
            contact: data.contact.clone(),
            notes: data.notes.clone(),
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn edit(
        &self,
        customer_id: &str,
        data: &CustomerData,
    ) -> Result<CustomerIdentity, ProcessorError> {
        let mut state = self.state();
        state.edit_calls += 1;

        if let Some(err) = state.edit_error.clone() {
            return Err(err);
        }

        let customer = state
            .customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| ProcessorError::not_found("customer"))?;

        customer.name = data.name.clone();
        customer.email = data.email.clone();
        customer.contact = data.contact.clone();
        customer.notes = data.notes.clone();
        Ok(customer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerNotes;

    fn data(email: &str) -> CustomerData {
        CustomerData {
            name: "Asha".into(),
            email: email.into(),
            contact: String::new(),
            notes: CustomerNotes::new(),
        }
    }

    #[tokio::test]
    async fn create_rejects_matching_identity() {
        let registry = MockCustomerRegistry::new();
        registry.create(&data("a@example.com")).await.unwrap();

        let err = registry.create(&data("A@Example.com")).await.unwrap_err();
        assert!(err.is_duplicate_customer());
        assert_eq!(registry.customers().len(), 1);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let registry = MockCustomerRegistry::new();
        registry.create(&data("a@example.com")).await.unwrap();
        registry.create(&data("b@example.com")).await.unwrap();
        registry.create(&data("c@example.com")).await.unwrap();

        let listed = registry.list_recent(2).await.unwrap();
        let emails: Vec<_> = listed.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["c@example.com", "b@example.com"]);
    }

    #[tokio::test]
    async fn injected_edit_error_is_returned() {
        let registry = MockCustomerRegistry::new();
        let created = registry.create(&data("a@example.com")).await.unwrap();
        registry.fail_edits_with(ProcessorError::network("timeout"));

        assert!(registry.edit(&created.id, &data("a@example.com")).await.is_err());
        assert_eq!(registry.calls().edit, 1);
    }
}
