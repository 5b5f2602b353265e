//! Redis configuration.
//!
//! Optional: with no URL configured the node runs on process-local
//! counters, which is fine for a single instance and for tests.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RedisConfig {
    /// Redis connection URL. Empty disables the shared store.
    #[serde(default)]
    pub url: String,
}

impl RedisConfig {
    /// Whether a shared store is configured.
    pub fn enabled(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled()
            && !self.url.starts_with("redis://")
            && !self.url.starts_with("rediss://")
        {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}
