//! Errors returned by payment processor ports.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Error from a Razorpay-facing port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorError {
    /// Error kind for categorization.
    pub kind: ProcessorErrorKind,

    /// Human-readable message.
    pub message: String,

    /// Processor's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl ProcessorError {
    pub fn new(kind: ProcessorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider_code: None,
            retryable: kind.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorKind::NetworkError, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorKind::NotConfigured, message)
    }

    pub fn duplicate_customer(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorKind::DuplicateCustomer, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ProcessorErrorKind::NotFound, format!("{} not found", resource))
    }

    pub fn is_duplicate_customer(&self) -> bool {
        self.kind == ProcessorErrorKind::DuplicateCustomer
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ProcessorError {}

impl From<ProcessorError> for DomainError {
    fn from(err: ProcessorError) -> Self {
        let code = match err.kind {
            ProcessorErrorKind::BadRequest | ProcessorErrorKind::DuplicateCustomer => {
                ErrorCode::ValidationFailed
            }
            _ => ErrorCode::ExternalServiceError,
        };

        DomainError::new(code, err.message)
    }
}

/// Processor error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorErrorKind {
    /// Credentials missing from configuration.
    NotConfigured,

    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// A customer with the same identity already exists.
    DuplicateCustomer,

    /// Request rejected as invalid.
    BadRequest,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Processor-side failure.
    ProviderError,
}

impl ProcessorErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorErrorKind::NetworkError
                | ProcessorErrorKind::RateLimitExceeded
                | ProcessorErrorKind::ProviderError
        )
    }
}

impl std::fmt::Display for ProcessorErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorErrorKind::NotConfigured => "not_configured",
            ProcessorErrorKind::NetworkError => "network_error",
            ProcessorErrorKind::AuthenticationError => "authentication_error",
            ProcessorErrorKind::DuplicateCustomer => "duplicate_customer",
            ProcessorErrorKind::BadRequest => "bad_request",
            ProcessorErrorKind::NotFound => "not_found",
            ProcessorErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ProcessorErrorKind::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_kind() {
        assert!(ProcessorError::network("timeout").retryable);
        assert!(!ProcessorError::duplicate_customer("exists").retryable);
        assert!(!ProcessorError::not_found("customer").retryable);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = ProcessorError::duplicate_customer("Customer already exists for the merchant");
        assert_eq!(
            err.to_string(),
            "duplicate_customer: Customer already exists for the merchant"
        );
        assert!(err.is_duplicate_customer());
    }

    #[test]
    fn converts_to_domain_error() {
        let err: DomainError = ProcessorError::network("down").into();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }
}
