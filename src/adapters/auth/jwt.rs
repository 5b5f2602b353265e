//! JWT bearer-token verifier.
//!
//! Tokens are issued by the platform's account service and verified here
//! with a shared HS256 secret. Verification checks signature and expiry;
//! the participant entry is tournament-scoped and resolved separately by
//! the gateway through `RoleResolver`.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, CallerIdentity, Role, UserId};
use crate::ports::TokenVerifier;

/// Configuration for the JWT verifier.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 shared secret.
    pub secret: String,
    /// Expected issuer claim; unchecked when empty.
    pub issuer: String,
}

/// Claims carried by platform-issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject, the user ID.
    sub: String,
    /// Platform role; absent for plain accounts, which join as spectators.
    #[serde(default)]
    role: Option<Role>,
    /// Expiry, Unix epoch seconds.
    exp: i64,
    #[serde(default)]
    iss: Option<String>,
}

pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        if !config.issuer.is_empty() {
            validation.set_issuer(&[&config.issuer]);
        }
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

fn map_error(e: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(map_error)?;
        let user_id = UserId::new(data.claims.sub).map_err(|_| AuthError::TokenInvalid)?;
        let role = data.claims.role.unwrap_or(Role::Spectator);

        Ok(CallerIdentity::new(user_id, role, None))
    }
}
