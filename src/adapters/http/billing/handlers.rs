//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to the webhook pipeline and the
//! customer resolver.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::customer::{CustomerIdentityResolver, ResolveCustomerError};
use crate::application::handlers::webhook::{IngressGuard, IngressRequest, WebhookEventRouter};
use crate::domain::customer::CustomerData;
use crate::domain::foundation::Timestamp;
use crate::domain::webhook::WebhookError;
use crate::ports::ProcessorErrorKind;

use super::dto::{
    CustomerResponse, ErrorResponse, HealthResponse, ResolveCustomerRequest, WebhookAckResponse,
};

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const REAL_IP_HEADER: &str = "x-real-ip";
const UNKNOWN_CLIENT: &str = "unknown";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct BillingAppState {
    pub ingress_guard: Arc<IngressGuard>,
    pub event_router: Arc<WebhookEventRouter>,
    pub customer_resolver: Arc<CustomerIdentityResolver>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/webhooks/razorpay - Handle Razorpay webhook events
pub async fn handle_razorpay_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAckResponse>, WebhookApiError> {
    let client_id = client_id(&headers);
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let now = Timestamp::now();
    let admitted = state
        .ingress_guard
        .admit(
            IngressRequest {
                body: &body,
                signature,
                client_id: &client_id,
            },
            now,
        )
        .await?;

    tracing::debug!(
        event_id = %admitted.event_id,
        client_id = %client_id,
        "Webhook admitted"
    );

    state.event_router.route(&admitted.envelope, now).await;

    Ok(Json(WebhookAckResponse::acknowledged(admitted.envelope.event)))
}

/// Caller identity: first `x-forwarded-for` entry, else `x-real-ip`.
///
/// Both headers are trusted as sent.
pub fn client_id(headers: &HeaderMap) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_value(FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_value(REAL_IP_HEADER))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

// ════════════════════════════════════════════════════════════════════════════════
// Customers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/customers - Find or create the processor customer
pub async fn resolve_customer(
    State(state): State<BillingAppState>,
    Json(request): Json<ResolveCustomerRequest>,
) -> Result<Json<CustomerResponse>, CustomerApiError> {
    let data = CustomerData::from(request);
    let customer = state.customer_resolver.find_or_create(&data).await?;
    Ok(Json(CustomerResponse::from(customer)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness
pub async fn health(State(state): State<BillingAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        webhooks_configured: state.ingress_guard.is_configured(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Converts ingress rejections to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            "Internal error processing webhook".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse::new(self.0.error_code(), message);
        let mut response = (status, Json(body)).into_response();

        if let WebhookError::RateLimited { retry_after_secs } = self.0 {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

/// Converts customer resolution failures to HTTP responses.
#[derive(Debug)]
pub struct CustomerApiError(pub ResolveCustomerError);

impl From<ResolveCustomerError> for CustomerApiError {
    fn from(err: ResolveCustomerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CustomerApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            ResolveCustomerError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ResolveCustomerError::Processor(e) => match e.kind {
                ProcessorErrorKind::NotConfigured => {
                    (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR")
                }
                ProcessorErrorKind::DuplicateCustomer => (StatusCode::CONFLICT, "DUPLICATE_CUSTOMER"),
                ProcessorErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
                _ => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            },
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Customer resolution failed");
        }

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
