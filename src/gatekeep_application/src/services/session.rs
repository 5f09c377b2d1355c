use chrono::{DateTime, Utc};
use gatekeep_core::{DuplicateField, RefreshToken, Session, SessionStore, SessionStoreError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{access_token::AccessTokenSigner, config::SessionConfig};

/// Error types returned by the session lifecycle
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid token was provided")]
    InvalidToken,
    #[error("user already logged in")]
    AlreadyLoggedIn,
    #[error("session operation was cancelled")]
    Cancelled,
    #[error("internal service error")]
    Internal,
}

/// Credentials handed to a client after login or refresh
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: RefreshToken,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Session service - issues, rotates and renews sessions
pub struct SessionService<S>
where
    S: SessionStore,
{
    session_store: S,
    config: SessionConfig,
    signer: AccessTokenSigner,
}

impl<S> SessionService<S>
where
    S: SessionStore,
{
    pub fn new(session_store: S, config: SessionConfig) -> Self {
        let signer =
            AccessTokenSigner::new(config.token_secret.clone(), config.access_token_duration);
        Self {
            session_store,
            config,
            signer,
        }
    }

    /// Start a new session for an authenticated user
    ///
    /// Refresh token collisions are retried with a fresh token up to
    /// `max_token_retries` times. A duplicate on any other field means the
    /// store only allows one session per user.
    #[tracing::instrument(name = "SessionService::create_session", skip_all, fields(user_id = %user_id))]
    pub async fn create_session(
        &self,
        cancel: &CancellationToken,
        user_id: Uuid,
    ) -> Result<TokenSet, SessionError> {
        tracing::debug!("Attempting to create new session");

        for attempt in 1..=self.config.max_token_retries {
            ensure_active(cancel)?;

            let session = Session::new(user_id, generate_token()?, self.config.session_duration)
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to compute session expiry");
                    SessionError::Internal
                })?;

            match self.session_store.append_session(&session).await {
                Ok(()) => {
                    let token_set = self.issue(&session)?;
                    tracing::info!(
                        refresh_expires_at = %token_set.refresh_expires_at,
                        refresh_token_prefix = token_set.refresh_token.prefix(),
                        "Session created successfully"
                    );
                    return Ok(token_set);
                }
                Err(SessionStoreError::Duplicate(DuplicateField::Token)) => {
                    tracing::warn!(
                        attempt,
                        attempted_token_prefix = session.token().prefix(),
                        "Session token collision detected, retrying"
                    );
                }
                Err(SessionStoreError::Duplicate(field)) => {
                    tracing::warn!(
                        duplication_field = %field,
                        "User already has an active session"
                    );
                    return Err(SessionError::AlreadyLoggedIn);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to append session to the store");
                    return Err(SessionError::Internal);
                }
            }
        }

        tracing::error!(
            max_retries = self.config.max_token_retries,
            "Failed to create unique session token after multiple retries"
        );
        Err(SessionError::Internal)
    }

    /// Mint a new access token for the owner of a live session
    ///
    /// The refresh token and its expiry are left untouched.
    #[tracing::instrument(
        name = "SessionService::refresh_access_token",
        skip_all,
        fields(refresh_token_prefix = refresh_token.prefix())
    )]
    pub async fn refresh_access_token(
        &self,
        cancel: &CancellationToken,
        refresh_token: &RefreshToken,
    ) -> Result<String, SessionError> {
        tracing::debug!("Attempting to refresh access token");

        let session = self.find_session(cancel, refresh_token).await?;

        self.signer.sign(session.user_id()).map_err(|e| {
            tracing::error!(user_id = %session.user_id(), error = %e, "Failed to sign access token");
            SessionError::Internal
        })
    }

    /// Rotate the refresh token of a live session and extend its expiry
    ///
    /// The presented token stops resolving as soon as the update is stored.
    /// The update only applies while the session still holds the presented
    /// token, so concurrent refreshes with one token yield a single winner.
    #[tracing::instrument(
        name = "SessionService::refresh_session",
        skip_all,
        fields(refresh_token_prefix = refresh_token.prefix())
    )]
    pub async fn refresh_session(
        &self,
        cancel: &CancellationToken,
        refresh_token: &RefreshToken,
    ) -> Result<TokenSet, SessionError> {
        tracing::debug!("Attempting to refresh session");

        let mut session = self.find_session(cancel, refresh_token).await?;

        for attempt in 1..=self.config.max_token_retries {
            ensure_active(cancel)?;

            session
                .refresh(generate_token()?, self.config.session_duration)
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to compute session expiry");
                    SessionError::Internal
                })?;

            match self
                .session_store
                .update_session(refresh_token, &session)
                .await
            {
                Ok(()) => {
                    let token_set = self.issue(&session)?;
                    tracing::info!(
                        user_id = %session.user_id(),
                        refresh_expires_at = %token_set.refresh_expires_at,
                        "Session refreshed successfully"
                    );
                    return Ok(token_set);
                }
                Err(SessionStoreError::Duplicate(DuplicateField::Token)) => {
                    tracing::warn!(
                        attempt,
                        attempted_token_prefix = session.token().prefix(),
                        "Session token collision detected, retrying"
                    );
                }
                Err(SessionStoreError::SessionNotFound) => {
                    tracing::error!("Refresh token was rotated or expired concurrently");
                    return Err(SessionError::Internal);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to update session in the store");
                    return Err(SessionError::Internal);
                }
            }
        }

        tracing::error!(
            max_retries = self.config.max_token_retries,
            "Failed to rotate session token after multiple retries"
        );
        Err(SessionError::Internal)
    }

    async fn find_session(
        &self,
        cancel: &CancellationToken,
        refresh_token: &RefreshToken,
    ) -> Result<Session, SessionError> {
        let lookup = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Session lookup cancelled");
                return Err(SessionError::Cancelled);
            }
            result = self.session_store.find_by_token(refresh_token) => result,
        };

        lookup.map_err(|e| match e {
            SessionStoreError::SessionNotFound => {
                tracing::warn!("Unknown or expired refresh token");
                SessionError::InvalidToken
            }
            e => {
                tracing::error!(error = %e, "Failed to look up session");
                SessionError::Internal
            }
        })
    }

    fn issue(&self, session: &Session) -> Result<TokenSet, SessionError> {
        let access_token = self.signer.sign(session.user_id()).map_err(|e| {
            tracing::error!(
                user_id = %session.user_id(),
                error = %e,
                "Failed to generate access token for session"
            );
            SessionError::Internal
        })?;

        Ok(TokenSet {
            access_token,
            refresh_token: session.token().clone(),
            refresh_expires_at: session.expires_at(),
        })
    }
}

fn generate_token() -> Result<RefreshToken, SessionError> {
    RefreshToken::generate().map_err(|e| {
        tracing::error!(error = %e, "Generating refresh token failed");
        SessionError::Internal
    })
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), SessionError> {
    if cancel.is_cancelled() {
        tracing::info!("Session operation cancelled");
        return Err(SessionError::Cancelled);
    }
    Ok(())
}
