use chrono::{Duration, Utc};
use gatekeep_core::AccessClaims;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error("Access token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("Failed to sign access token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs short-lived HS256 access tokens asserting a user id.
#[derive(Debug, Clone)]
pub struct AccessTokenSigner {
    secret: Secret<String>,
    ttl: Duration,
}

impl AccessTokenSigner {
    pub fn new(secret: Secret<String>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn sign(&self, user_id: Uuid) -> Result<String, AccessTokenError> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(AccessTokenError::ExpiryOutOfRange)?;

        let claims = AccessClaims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )?;

        Ok(token)
    }
}
