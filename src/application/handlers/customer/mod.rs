//! Customer handlers.

mod find_or_create_customer;

pub use find_or_create_customer::{
    CustomerIdentityResolver, ResolveCustomerError, DEFAULT_SEARCH_LIMIT,
};
