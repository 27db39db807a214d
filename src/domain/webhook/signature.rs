//! Razorpay webhook signature verification.
//!
//! Razorpay signs the raw request body with HMAC-SHA256 keyed by the webhook
//! secret and sends the lowercase hex digest in `X-Razorpay-Signature`.
//! Verification must run over the exact received bytes, never over a
//! re-serialized body.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for Razorpay webhook signatures.
pub struct WebhookSignatureVerifier {
    secret: SecretString,
}

impl WebhookSignatureVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies `signature` against the HMAC of `payload`.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header absent or blank
    /// - `InvalidSignature` - not hex, wrong length, or digest mismatch
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let provided = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = compute_signature(self.secret.expose_secret().as_bytes(), payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }
}

/// Computes the hex HMAC-SHA256 of `payload`, as Razorpay would send it.
///
/// Used by callers that need to produce signed deliveries, such as
/// integration tests and local replay tooling.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, WebhookError> {
    compute_signature(secret.as_bytes(), payload).map(hex::encode)
}

fn compute_signature(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
