use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    email::Email, refresh_token::RefreshToken, session::Session, user::User, username::Username,
};

/// Attribute whose uniqueness constraint a write violated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DuplicateField {
    Username,
    Email,
    Token,
    Other(String),
}

impl DuplicateField {
    /// Map a storage-level field name onto the typed variant.
    pub fn from_name(name: &str) -> Self {
        match name {
            "username" => Self::Username,
            "email" => Self::Email,
            "token" => Self::Token,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Token => "token",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User with the same {0} already exists")]
    Duplicate(DuplicateField),
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Duplicate(a), Self::Duplicate(b)) => a == b,
            (Self::UserNotFound, Self::UserNotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence for users. Implementations enforce uniqueness of username and
/// email and report the violated field through [`UserStoreError::Duplicate`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn append_user(&self, user: User) -> Result<(), UserStoreError>;
    async fn find_by_username(&self, username: &Username) -> Result<User, UserStoreError>;
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError>;
}

// SessionStore port trait and errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session with the same {0} already exists")]
    Duplicate(DuplicateField),
    #[error("Session not found")]
    SessionNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for SessionStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Duplicate(a), Self::Duplicate(b)) => a == b,
            (Self::SessionNotFound, Self::SessionNotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence for sessions.
///
/// Refresh tokens are unique across sessions; a collision is reported as
/// `Duplicate(DuplicateField::Token)`. Lookups treat an expired session as
/// [`SessionStoreError::SessionNotFound`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn append_session(&self, session: &Session) -> Result<(), SessionStoreError>;
    async fn find_by_token(&self, token: &RefreshToken) -> Result<Session, SessionStoreError>;
    /// Replace the stored session with the same id, provided it still holds
    /// `previous_token`. Otherwise the update is rejected with
    /// [`SessionStoreError::SessionNotFound`].
    async fn update_session(
        &self,
        previous_token: &RefreshToken,
        session: &Session,
    ) -> Result<(), SessionStoreError>;
}
