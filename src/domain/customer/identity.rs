//! Customer identity value types.
//!
//! Customers live in the processor's registry; nothing here is persisted
//! locally. Identity is matched on email or contact number.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Free-form key/value notes attached to a customer record.
pub type CustomerNotes = BTreeMap<String, String>;

/// A customer as known to the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    #[serde(default)]
    pub notes: CustomerNotes,
}

/// Desired customer details supplied by the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    pub contact: String,
    #[serde(default)]
    pub notes: CustomerNotes,
}

impl CustomerData {
    /// At least one of email or contact is required to match on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if normalize_email(&self.email).is_none() && normalize_contact(&self.contact).is_none() {
            return Err(ValidationError::empty_field("email_or_contact"));
        }
        Ok(())
    }
}

impl CustomerIdentity {
    /// True if this record shares a non-empty email or contact with `data`.
    pub fn matches(&self, data: &CustomerData) -> bool {
        let email_match = match (normalize_email(&self.email), normalize_email(&data.email)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let contact_match = match (
            normalize_contact(&self.contact),
            normalize_contact(&data.contact),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        email_match || contact_match
    }

    /// True if any stored field differs from `data`.
    pub fn differs_from(&self, data: &CustomerData) -> bool {
        self.name != data.name
            || self.email != data.email
            || self.contact != data.contact
            || self.notes != data.notes
    }
}

fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    (!email.is_empty()).then(|| email.to_ascii_lowercase())
}

/// Keeps digits and a leading `+` so formatting differences still match.
fn normalize_contact(contact: &str) -> Option<String> {
    let trimmed = contact.trim();
    let mut normalized: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if normalized.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        normalized.insert(0, '+');
    }
    Some(normalized)
}
