//! Application configuration.
//!
//! Type-safe configuration loaded from environment variables with the
//! `ARENA_LIVE` prefix; nested values use `__` as the separator, e.g.
//! `ARENA_LIVE__SERVER__PORT=8080` sets `server.port`. A `.env` file is
//! read first when present.

mod auth;
mod error;
mod realtime;
mod redis;
mod rules;
mod server;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use realtime::RealtimeConfig;
pub use redis::RedisConfig;
pub use rules::RulesConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::domain::admission::AdmissionLimits;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Bind address, environment, logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared counter store; optional.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Token verification.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Admission limits; every field has a production default.
    #[serde(default)]
    pub limits: AdmissionLimits,

    /// Debounce and heartbeat tuning.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Competition rules.
    #[serde(default)]
    pub rules: RulesConfig,
}

impl AppConfig {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ARENA_LIVE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.auth.validate()?;
        self.realtime.validate()?;

        if self.limits.max_sessions_per_user == 0
            || self.limits.max_sessions_per_addr == 0
            || self.limits.messages_per_sec == 0
            || self.limits.message_burst == 0
            || self.limits.room_capacity == 0
            || self.limits.max_payload_bytes == 0
            || self.limits.strike_limit == 0
        {
            return Err(ValidationError::InvalidLimits);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates_apart_from_the_secret() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("auth.jwt_secret"))
        ));

        config.auth.jwt_secret = "s3cret".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zeroed_limits_are_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "s3cret".into();
        config.limits.room_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLimits)
        ));
    }
}
