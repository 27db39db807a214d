//! Payment configuration (Razorpay)
//!
//! Every field is optional. Missing credentials do not stop the service from
//! starting; webhook deliveries are answered with 503 until they are set.

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::razorpay::DEFAULT_API_BASE_URL;

#[derive(Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Razorpay key id (`rzp_test_...` / `rzp_live_...`)
    pub razorpay_key_id: Option<String>,

    pub razorpay_key_secret: Option<String>,

    /// Shared secret for `x-razorpay-signature`
    pub razorpay_webhook_secret: Option<String>,

    /// Override for the Razorpay REST base URL
    pub api_base_url: Option<String>,
}

impl PaymentConfig {
    pub fn key_id(&self) -> Option<SecretString> {
        non_blank(&self.razorpay_key_id)
    }

    pub fn key_secret(&self) -> Option<SecretString> {
        non_blank(&self.razorpay_key_secret)
    }

    pub fn webhook_secret(&self) -> Option<SecretString> {
        non_blank(&self.razorpay_webhook_secret)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// True when API credentials and webhook secret are all present.
    pub fn is_configured(&self) -> bool {
        self.key_id().is_some() && self.key_secret().is_some() && self.webhook_secret().is_some()
    }

    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id
            .as_deref()
            .is_some_and(|k| k.starts_with("rzp_test_"))
    }

    pub fn is_live_mode(&self) -> bool {
        self.razorpay_key_id
            .as_deref()
            .is_some_and(|k| k.starts_with("rzp_live_"))
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.key_id().is_some() != self.key_secret().is_some() {
            return Err(ValidationError::IncompleteRazorpayCredentials);
        }
        if self.key_id().is_some() && !self.is_test_mode() && !self.is_live_mode() {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }
        if production && !self.api_base_url().starts_with("https://") {
            return Err(ValidationError::ApiBaseUrlMustBeHttps);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("razorpay_key_id", &self.razorpay_key_id.as_ref().map(|_| "[REDACTED]"))
            .field("razorpay_key_secret", &self.razorpay_key_secret.as_ref().map(|_| "[REDACTED]"))
            .field(
                "razorpay_webhook_secret",
                &self.razorpay_webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url())
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<SecretString> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::new(v.to_string()))
}
