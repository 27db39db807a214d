//! IngressGuard - admission checks every webhook delivery must pass.
//!
//! Order is fixed: configuration, rate limit, signature, envelope parse,
//! replay. The router only ever sees deliveries that cleared all of them.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::webhook::{
    replay_event_id, WebhookEnvelope, WebhookError, WebhookSignatureVerifier,
};
use crate::ports::{RateLimitKey, RateLimitResult, RateLimiter, ReplayStore};

/// Default replay window (5 minutes).
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

/// One inbound delivery as seen at the transport boundary.
#[derive(Debug, Clone, Copy)]
pub struct IngressRequest<'a> {
    /// Raw, unparsed request body.
    pub body: &'a [u8],
    /// Value of `x-razorpay-signature`, if present.
    pub signature: Option<&'a str>,
    /// Caller identity used for rate limiting.
    pub client_id: &'a str,
}

/// A delivery that passed every check.
#[derive(Debug, Clone)]
pub struct AdmittedWebhook {
    pub envelope: WebhookEnvelope,
    pub event_id: String,
}

pub struct IngressGuard {
    verifier: Option<WebhookSignatureVerifier>,
    rate_limiter: Arc<dyn RateLimiter>,
    replay_store: Arc<dyn ReplayStore>,
    replay_window_secs: u64,
}

impl IngressGuard {
    /// `verifier` is `None` when processor credentials are not configured;
    /// every delivery is then refused with `NotConfigured`.
    pub fn new(
        verifier: Option<WebhookSignatureVerifier>,
        rate_limiter: Arc<dyn RateLimiter>,
        replay_store: Arc<dyn ReplayStore>,
    ) -> Self {
        Self {
            verifier,
            rate_limiter,
            replay_store,
            replay_window_secs: DEFAULT_REPLAY_WINDOW_SECS,
        }
    }

    pub fn with_replay_window_secs(mut self, secs: u64) -> Self {
        self.replay_window_secs = secs;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn admit(
        &self,
        request: IngressRequest<'_>,
        now: Timestamp,
    ) -> Result<AdmittedWebhook, WebhookError> {
        // 1. Configuration
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            tracing::error!("Webhook received but Razorpay credentials are not configured");
            WebhookError::NotConfigured("Razorpay credentials")
        })?;

        // 2. Rate limit, before any body work
        self.check_rate_limit(request.client_id).await?;

        // 3. Signature over the raw body
        if let Err(e) = verifier.verify(request.body, request.signature) {
            tracing::warn!(
                client_id = %request.client_id,
                error = %e,
                "Webhook signature rejected"
            );
            return Err(e);
        }

        // 4. Replay
        let envelope = WebhookEnvelope::parse(request.body).map_err(|e| {
            tracing::warn!(client_id = %request.client_id, error = %e, "Malformed webhook body");
            e
        })?;
        let event_id = replay_event_id(&envelope, now);
        self.claim_event(&event_id, now).await?;

        Ok(AdmittedWebhook { envelope, event_id })
    }

    async fn check_rate_limit(&self, client_id: &str) -> Result<(), WebhookError> {
        let result = self
            .rate_limiter
            .check(RateLimitKey::webhook_client(client_id))
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Rate limiter unavailable");
                WebhookError::StorageError(e.to_string())
            })?;

        match result {
            RateLimitResult::Allowed(_) => Ok(()),
            RateLimitResult::Denied(denied) => {
                tracing::warn!(
                    client_id = %client_id,
                    limit = denied.limit,
                    retry_after_secs = denied.retry_after_secs,
                    "Webhook rate limit exceeded"
                );
                Err(WebhookError::RateLimited {
                    retry_after_secs: denied.retry_after_secs,
                })
            }
        }
    }

    async fn claim_event(&self, event_id: &str, now: Timestamp) -> Result<(), WebhookError> {
        let storage_error = |e: crate::ports::ReplayStoreError| {
            tracing::error!(event_id = %event_id, error = %e, "Replay store unavailable");
            WebhookError::StorageError(e.to_string())
        };

        let cutoff = now.minus_secs(self.replay_window_secs);
        let evicted = self.replay_store.sweep(cutoff).await.map_err(storage_error)?;
        if evicted > 0 {
            tracing::debug!(evicted, "Swept expired replay entries");
        }

        if !self
            .replay_store
            .claim(event_id, now)
            .await
            .map_err(storage_error)?
        {
            tracing::warn!(event_id = %event_id, "Duplicate webhook rejected");
            return Err(WebhookError::DuplicateEvent(event_id.to_string()));
        }

        Ok(())
    }
}
