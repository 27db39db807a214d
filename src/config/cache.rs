//! Downstream user-cache configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Key prefix of the profile cache (`{prefix}:{user_id}`)
    #[serde(default = "default_user_key_prefix")]
    pub user_key_prefix: String,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let prefix = self.user_key_prefix.trim();
        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidValue("cache.user_key_prefix"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_key_prefix: default_user_key_prefix(),
        }
    }
}

fn default_user_key_prefix() -> String {
    "user".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let config = CacheConfig::default();
        assert_eq!(config.user_key_prefix, "user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let config = CacheConfig {
            user_key_prefix: " ".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
