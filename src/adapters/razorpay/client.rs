//! Razorpay REST client.
//!
//! Implements `CustomerRegistry` and `SubscriptionGateway` over the Razorpay
//! v1 API using HTTP basic auth (`key_id:key_secret`).
//!
//! Credentials are optional at construction. A call made without them fails
//! with `ProcessorErrorKind::NotConfigured` instead of the service refusing
//! to start.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::customer::{CustomerData, CustomerIdentity};
use crate::ports::{
    CreateSubscriptionRequest, CustomerRegistry, GatewaySubscription, ProcessorError,
    ProcessorErrorKind, SubscriptionGateway,
};

use super::api_types::{
    CustomerBody, RazorpayCollection, RazorpayCustomer, RazorpayErrorEnvelope,
    RazorpaySubscription,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com/v1";

/// Razorpay's maximum page size for list endpoints.
const MAX_PAGE_SIZE: u32 = 100;

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: Option<SecretString>,
    key_secret: Option<SecretString>,
    api_base_url: String,
}

impl RazorpayConfig {
    pub fn new(key_id: Option<SecretString>, key_secret: Option<SecretString>) -> Self {
        Self {
            key_id,
            key_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.key_id.as_ref()?.expose_secret().trim();
        let secret = self.key_secret.as_ref()?.expose_secret().trim();
        (!id.is_empty() && !secret.is_empty()).then_some((id, secret))
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("configured", &self.is_configured())
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Razorpay API client.
pub struct RazorpayClient {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ProcessorError> {
        let (id, secret) = self
            .config
            .credentials()
            .ok_or_else(|| ProcessorError::not_configured("Razorpay credentials not configured"))?;
        Ok(builder.basic_auth(id, Some(secret)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<T, ProcessorError> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        let response = check_status(operation, response).await?;

        response.json::<T>().await.map_err(|e| {
            ProcessorError::new(
                ProcessorErrorKind::ProviderError,
                format!("Failed to parse Razorpay response: {}", e),
            )
        })
    }
}

async fn check_status(operation: &'static str, response: Response) -> Result<Response, ProcessorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = classify_error(status, &body);
    tracing::error!(
        operation,
        status = status.as_u16(),
        kind = %error.kind,
        error = %error.message,
        "Razorpay request failed"
    );
    Err(error)
}

/// Map a non-2xx Razorpay response to a `ProcessorError`.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> ProcessorError {
    let parsed = serde_json::from_str::<RazorpayErrorEnvelope>(body).ok();
    let (code, description) = match parsed {
        Some(envelope) => (envelope.error.code, envelope.error.description),
        None => (String::new(), body.to_string()),
    };

    let kind = match status {
        StatusCode::BAD_REQUEST
            if code == "BAD_REQUEST_ERROR"
                && description.to_ascii_lowercase().contains("already exists") =>
        {
            ProcessorErrorKind::DuplicateCustomer
        }
        StatusCode::BAD_REQUEST => ProcessorErrorKind::BadRequest,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProcessorErrorKind::AuthenticationError,
        StatusCode::NOT_FOUND => ProcessorErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ProcessorErrorKind::RateLimitExceeded,
        _ => ProcessorErrorKind::ProviderError,
    };

    let message = if description.is_empty() {
        format!("Razorpay API error ({})", status.as_u16())
    } else {
        description
    };

    let error = ProcessorError::new(kind, message);
    if code.is_empty() {
        error
    } else {
        error.with_provider_code(code)
    }
}

#[async_trait]
impl CustomerRegistry for RazorpayClient {
    async fn list_recent(&self, limit: u32) -> Result<Vec<CustomerIdentity>, ProcessorError> {
        let count = limit.clamp(1, MAX_PAGE_SIZE);
        let builder = self
            .http_client
            .get(self.url("/customers"))
            .query(&[("count", count)]);

        let page: RazorpayCollection<RazorpayCustomer> =
            self.send("list_customers", builder).await?;

        Ok(page.items.into_iter().map(CustomerIdentity::from).collect())
    }

    async fn create(&self, data: &CustomerData) -> Result<CustomerIdentity, ProcessorError> {
        let builder = self
            .http_client
            .post(self.url("/customers"))
            .json(&CustomerBody::from(data));

        let customer: RazorpayCustomer = self.send("create_customer", builder).await?;
        Ok(customer.into())
    }

    async fn edit(
        &self,
        customer_id: &str,
        data: &CustomerData,
    ) -> Result<CustomerIdentity, ProcessorError> {
        let builder = self
            .http_client
            .put(self.url(&format!("/customers/{}", customer_id)))
            .json(&CustomerBody::from(data));

        let customer: RazorpayCustomer = self.send("edit_customer", builder).await?;
        Ok(customer.into())
    }
}

#[async_trait]
impl SubscriptionGateway for RazorpayClient {
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, ProcessorError> {
        let mut body = json!({
            "plan_id": request.plan_id,
            "total_count": request.total_count,
            "customer_notify": u8::from(request.customer_notify),
            "notes": request.notes,
        });
        if let Some(customer_id) = request.customer_id {
            body["customer_id"] = json!(customer_id);
        }
        if let Some(start_at) = request.start_at {
            body["start_at"] = json!(start_at);
        }

        let builder = self.http_client.post(self.url("/subscriptions")).json(&body);
        let sub: RazorpaySubscription = self.send("create_subscription", builder).await?;
        Ok(sub.into())
    }

    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<GatewaySubscription>, ProcessorError> {
        let builder = self
            .http_client
            .get(self.url(&format!("/subscriptions/{}", subscription_id)));

        match self
            .send::<RazorpaySubscription>("fetch_subscription", builder)
            .await
        {
            Ok(sub) => Ok(Some(sub.into())),
            Err(e) if e.kind == ProcessorErrorKind::NotFound => Ok(None),
            // Razorpay answers unknown ids with 400 "The id provided does not exist".
            Err(e)
                if e.kind == ProcessorErrorKind::BadRequest
                    && e.message.to_ascii_lowercase().contains("does not exist") =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> Result<GatewaySubscription, ProcessorError> {
        let builder = self
            .http_client
            .post(self.url(&format!("/subscriptions/{}/cancel", subscription_id)))
            .json(&json!({ "cancel_at_cycle_end": u8::from(at_cycle_end) }));

        let sub: RazorpaySubscription = self.send("cancel_subscription", builder).await?;
        Ok(sub.into())
    }

    async fn pause_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, ProcessorError> {
        let builder = self
            .http_client
            .post(self.url(&format!("/subscriptions/{}/pause", subscription_id)))
            .json(&json!({ "pause_at": "now" }));

        let sub: RazorpaySubscription = self.send("pause_subscription", builder).await?;
        Ok(sub.into())
    }

    async fn resume_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, ProcessorError> {
        let builder = self
            .http_client
            .post(self.url(&format!("/subscriptions/{}/resume", subscription_id)))
            .json(&json!({ "resume_at": "now" }));

        let sub: RazorpaySubscription = self.send("resume_subscription", builder).await?;
        Ok(sub.into())
    }
}
