//! Payment module - raw processor payments and their sanitized form.

mod raw;
mod sanitizer;

pub use raw::{PaymentMethodKind, RawCard, RawPayment};
pub use sanitizer::{
    mask_vpa, sanitize, CardDetails, NetbankingDetails, PaymentMethod, PaymentSummary, UpiDetails,
    WalletDetails,
};
