use gatekeep_core::AccessClaims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenAuthError {
    #[error("Missing token")]
    MissingToken,
    #[error("Token has expired")]
    Expired,
    #[error("Token error: {0}")]
    TokenError(jsonwebtoken::errors::Error),
}

/// Verifies access tokens locally with the shared HS256 secret; no storage
/// lookup is involved.
#[derive(Clone)]
pub struct LocalAccessTokenValidator {
    secret: Secret<String>,
    validation: Validation,
}

impl LocalAccessTokenValidator {
    pub fn new(secret: Secret<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self { secret, validation }
    }

    #[tracing::instrument(name = "LocalAccessTokenValidator::validate", skip_all)]
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenAuthError> {
        if token.is_empty() {
            return Err(TokenAuthError::MissingToken);
        }

        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenAuthError::Expired,
            _ => {
                tracing::debug!(error = %e, "Access token rejected");
                TokenAuthError::TokenError(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use gatekeep_application::AccessTokenSigner;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    const SECRET: &str = "validator-test-secret";

    fn validator() -> LocalAccessTokenValidator {
        LocalAccessTokenValidator::new(Secret::new(SECRET.to_owned()))
    }

    #[test]
    fn test_validate_signed_token() {
        let user_id = Uuid::new_v4();
        let signer = AccessTokenSigner::new(Secret::new(SECRET.to_owned()), Duration::minutes(10));
        let token = signer.sign(user_id).unwrap();

        let claims = validator().validate(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.lifetime_seconds(), 600);
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let signer = AccessTokenSigner::new(
            Secret::new("some-other-secret".to_owned()),
            Duration::minutes(10),
        );
        let token = signer.sign(Uuid::new_v4()).unwrap();

        let result = validator().validate(&token);

        assert!(matches!(result, Err(TokenAuthError::TokenError(_))));
    }

    #[test]
    fn test_expired_token() {
        let issued_at = Utc::now() - Duration::hours(1);
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::minutes(15)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = validator().validate(&token);

        assert!(matches!(result, Err(TokenAuthError::Expired)));
    }

    #[test]
    fn test_missing_and_garbage_tokens() {
        assert!(matches!(
            validator().validate(""),
            Err(TokenAuthError::MissingToken)
        ));
        assert!(matches!(
            validator().validate("not-a-jwt"),
            Err(TokenAuthError::TokenError(_))
        ));
    }
}
