//! Request and response DTOs for billing endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::customer::{CustomerData, CustomerIdentity, CustomerNotes};

// ════════════════════════════════════════════════════════════════════════════════
// Webhook DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to Razorpay for every admitted delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAckResponse {
    pub success: bool,
    /// The `event` string exactly as delivered.
    pub event: String,
}

impl WebhookAckResponse {
    pub fn acknowledged(event: impl Into<String>) -> Self {
        Self {
            success: true,
            event: event.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Customer DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to resolve (find or create) a processor customer.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveCustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub notes: CustomerNotes,
}

impl From<ResolveCustomerRequest> for CustomerData {
    fn from(req: ResolveCustomerRequest) -> Self {
        CustomerData {
            name: req.name,
            email: req.email,
            contact: req.contact,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub notes: CustomerNotes,
}

impl From<CustomerIdentity> for CustomerResponse {
    fn from(c: CustomerIdentity) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            contact: c.contact,
            notes: c.notes,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    /// False when Razorpay credentials are missing.
    pub webhooks_configured: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
