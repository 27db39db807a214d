//! Shared Redis for ingress state
//!
//! When this section is present, rate-limit windows, replay keys and
//! user-cache invalidation all go through one Redis so every instance sees
//! the same state.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Clone, Deserialize)]
pub struct RedisConfig {
    /// `redis://` or `rediss://`; may carry credentials.
    pub url: String,

    /// How long startup waits for the first connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl RedisConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Client for `url`; opening does not touch the network.
    pub fn open_client(&self) -> Result<::redis::Client, ::redis::RedisError> {
        ::redis::Client::open(self.url.as_str())
    }

    /// `url` with any password replaced, for logs and `Debug`.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.rsplit_once('@') {
            Some((userinfo, host)) => {
                let user = userinfo.split_once(':').map_or(userinfo, |(user, _)| user);
                format!("{}://{}:***@{}", scheme, user, host)
            }
            None => self.url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        ::redis::parse_redis_url(&self.url).ok_or(ValidationError::InvalidRedisUrl)?;
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::InvalidValue("redis.connect_timeout_secs"));
        }
        Ok(())
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("url", &self.redacted_url())
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    5
}
