//! Payment records as Razorpay delivers them.
//!
//! Only the fields the subsystem reads are declared; anything else in the
//! processor's payment entity (full card data, customer contact, notes) is
//! dropped at deserialization time and never reaches the sanitizer.

use serde::Deserialize;

/// Raw payment entity from `payload.payment.entity`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPayment {
    pub id: String,
    /// Amount in the smallest currency unit (paise for INR).
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub captured: bool,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub card: Option<RawCard>,
    #[serde(default)]
    pub vpa: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl RawPayment {
    /// The `method` discriminator as a closed set.
    pub fn method_kind(&self) -> PaymentMethodKind {
        PaymentMethodKind::from_discriminator(&self.method)
    }
}

/// Card sub-object. Full PAN and CVV are never declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCard {
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
}

/// Payment method discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethodKind {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Other,
}

impl PaymentMethodKind {
    pub fn from_discriminator(method: &str) -> Self {
        match method.trim().to_ascii_lowercase().as_str() {
            "card" => Self::Card,
            "upi" => Self::Upi,
            "netbanking" => Self::Netbanking,
            "wallet" => Self::Wallet,
            _ => Self::Other,
        }
    }
}
