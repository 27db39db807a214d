//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `SUBSCRIPTION_SYNC`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use subscription_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cache;
mod database;
mod error;
mod payment;
mod redis;
mod server;
mod webhook;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use redis::RedisConfig;
pub use server::{Environment, LogFormat, ServerConfig, MAX_REQUEST_TIMEOUT_SECS};
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; in-memory storage when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Redis; process-local stores and no user cache when absent
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Razorpay credentials
    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUBSCRIPTION_SYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTION_SYNC__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_ID=...` -> `payment.razorpay_key_id`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_SYNC")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.payment.validate(self.is_production())?;
        self.webhook.validate()?;
        self.cache.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SUBSCRIPTION_SYNC__SERVER__PORT",
        "SUBSCRIPTION_SYNC__SERVER__ENVIRONMENT",
        "SUBSCRIPTION_SYNC__DATABASE__URL",
        "SUBSCRIPTION_SYNC__REDIS__URL",
        "SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_ID",
        "SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_SECRET",
        "SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_WEBHOOK_SECRET",
        "SUBSCRIPTION_SYNC__WEBHOOK__RATE_LIMIT_MAX_REQUESTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn set_full_env() {
        env::set_var("SUBSCRIPTION_SYNC__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("SUBSCRIPTION_SYNC__REDIS__URL", "redis://localhost:6379");
        env::set_var("SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_ID", "rzp_test_xxx");
        env::set_var("SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_KEY_SECRET", "secret_xxx");
        env::set_var("SUBSCRIPTION_SYNC__PAYMENT__RAZORPAY_WEBHOOK_SECRET", "whsec_xxx");
    }

    #[test]
    fn test_load_with_nothing_set_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert!(!config.payment.is_configured());
        assert_eq!(config.webhook.rate_limit_max_requests, 100);
        assert_eq!(config.cache.user_key_prefix, "user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_full_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_full_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert_eq!(
            config.redis.as_ref().map(|r| r.url.as_str()),
            Some("redis://localhost:6379")
        );
        assert!(config.payment.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_numeric_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SUBSCRIPTION_SYNC__SERVER__PORT", "3000");
        env::set_var("SUBSCRIPTION_SYNC__WEBHOOK__RATE_LIMIT_MAX_REQUESTS", "5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.webhook.rate_limit_max_requests, 5);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SUBSCRIPTION_SYNC__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_invalid_optional_section_fails_validation() {
        let config = AppConfig {
            redis: Some(RedisConfig {
                url: "http://localhost".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRedisUrl));
    }
}
