//! Customer module - processor-side customer identity.

mod identity;

pub use identity::{CustomerData, CustomerIdentity, CustomerNotes};
