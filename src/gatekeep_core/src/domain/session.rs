use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::refresh_token::RefreshToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Session expiry is out of range")]
pub struct ExpiryOutOfRange;

/// A login session, identified by its current refresh token.
///
/// Exactly one token is live per session; [`Session::refresh`] replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
    user_id: Uuid,
    token: RefreshToken,
    created_at: DateTime<Utc>,
    refreshed_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        token: RefreshToken,
        duration: Duration,
    ) -> Result<Self, ExpiryOutOfRange> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at: now,
            refreshed_at: now,
            expires_at: expiry(now, duration)?,
        })
    }

    /// Reconstitute a session from storage.
    pub fn load(
        id: Uuid,
        user_id: Uuid,
        token: RefreshToken,
        created_at: DateTime<Utc>,
        refreshed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            token,
            created_at,
            refreshed_at,
            expires_at,
        }
    }

    /// Rotate the token and push the expiry to `now + duration`.
    ///
    /// Leaves the session unchanged when the expiry cannot be represented.
    pub fn refresh(
        &mut self,
        token: RefreshToken,
        duration: Duration,
    ) -> Result<(), ExpiryOutOfRange> {
        let now = Utc::now();
        self.expires_at = expiry(now, duration)?;
        self.token = token;
        self.refreshed_at = now;
        Ok(())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn token(&self) -> &RefreshToken {
        &self.token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

fn expiry(now: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>, ExpiryOutOfRange> {
    now.checked_add_signed(duration).ok_or(ExpiryOutOfRange)
}
