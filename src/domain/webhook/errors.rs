//! Webhook error types for Razorpay webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Processor credentials are not configured.
    #[error("Payment processor not configured: {0}")]
    NotConfigured(&'static str),

    /// Per-client request threshold exceeded for the current window.
    #[error("Too many requests, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u32 },

    /// Signature header absent.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature does not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Same event id seen within the replay window.
    #[error("Duplicate event: {0}")]
    DuplicateEvent(String),

    /// Request body is not a webhook envelope.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required nested field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Nested field present but not of the expected shape.
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Referenced subscription could not be found locally.
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// Payment event that carries no subscription reference.
    #[error("Payment {0} is not linked to a subscription")]
    Unlinked(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Storage operation failed (Redis/cache).
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl WebhookError {
    /// Returns true if Razorpay should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::NotConfigured(_)
                | WebhookError::RateLimited { .. }
                | WebhookError::Database(_)
                | WebhookError::StorageError(_)
        )
    }

    /// True when the delivery is acknowledged with 2xx despite the error.
    ///
    /// Handler-level failures never surface as error responses.
    pub fn is_acknowledged(&self) -> bool {
        self.status_code().is_success()
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine Razorpay's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry (429 backs off)
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,

            WebhookError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,

            WebhookError::DuplicateEvent(_) => StatusCode::CONFLICT,

            WebhookError::MissingField(_)
            | WebhookError::InvalidField { .. }
            | WebhookError::SubscriptionNotFound(_)
            | WebhookError::Unlinked(_) => StatusCode::OK,

            WebhookError::Database(_) | WebhookError::StorageError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::NotConfigured(_) => "CONFIGURATION_ERROR",
            WebhookError::RateLimited { .. } => "RATE_LIMITED",
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                "AUTHENTICATION_ERROR"
            }
            WebhookError::DuplicateEvent(_) => "REPLAY_DETECTED",
            WebhookError::MalformedPayload(_)
            | WebhookError::MissingField(_)
            | WebhookError::InvalidField { .. } => "VALIDATION_ERROR",
            WebhookError::SubscriptionNotFound(_) | WebhookError::Unlinked(_) => "NOT_FOUND",
            WebhookError::Database(_) | WebhookError::StorageError(_) => "INTERNAL_ERROR",
        }
    }
}
