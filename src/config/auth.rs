//! Authentication configuration.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// HS256 shared secret for verifying platform-issued tokens.
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected issuer claim; unchecked when empty.
    #[serde(default)]
    pub issuer: String,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("auth.jwt_secret"));
        }
        Ok(())
    }
}
