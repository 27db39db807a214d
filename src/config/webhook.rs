//! Webhook ingress configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Requests allowed per client per window
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    /// Fixed rate-limit window in seconds
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u32,

    /// How long a seen event id blocks redelivery, in seconds
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: u64,

    /// Recent customers scanned when resolving an identity
    #[serde(default = "default_customer_search_limit")]
    pub customer_search_limit: u32,
}

impl WebhookConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_limit_max_requests == 0 {
            return Err(ValidationError::InvalidValue("webhook.rate_limit_max_requests"));
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ValidationError::InvalidValue("webhook.rate_limit_window_secs"));
        }
        if self.replay_window_secs == 0 {
            return Err(ValidationError::InvalidValue("webhook.replay_window_secs"));
        }
        if self.customer_search_limit == 0 || self.customer_search_limit > 100 {
            return Err(ValidationError::InvalidValue("webhook.customer_search_limit"));
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window(),
            replay_window_secs: default_replay_window(),
            customer_search_limit: default_customer_search_limit(),
        }
    }
}

fn default_rate_limit_max_requests() -> u32 {
    100
}

fn default_rate_limit_window() -> u32 {
    60
}

fn default_replay_window() -> u64 {
    300
}

fn default_customer_search_limit() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WebhookConfig::default();
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.rate_limit_window_secs, 60);
        assert_eq!(config.replay_window_secs, 300);
        assert_eq!(config.customer_search_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = WebhookConfig {
            replay_window_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidValue("webhook.replay_window_secs"))
        );
    }

    #[test]
    fn test_search_limit_capped_at_page_size() {
        let config = WebhookConfig {
            customer_search_limit: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
