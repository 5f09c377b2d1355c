use std::sync::LazyLock;

use gatekeep_core::{Email, Password, User, UserStore, UserStoreError, Username};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// Verified against when the login matches no user, so both outcomes pay for
// one Argon2 verification.
static DUMMY_PASSWORD: LazyLock<Option<Password>> =
    LazyLock::new(|| Password::parse(Secret::new("Dummy-passw0rd".to_owned())).ok());

/// Error types returned by credential authentication
#[derive(Debug, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    #[error("invalid username, email or password")]
    InvalidCredentials,
    #[error("authentication was cancelled")]
    Cancelled,
    #[error("internal service error")]
    Internal,
}

/// Authentication service - checks a login and password against stored users
pub struct AuthenticationService<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> AuthenticationService<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    /// Resolve credentials to a user id
    ///
    /// # Arguments
    /// * `login` - Username, or an email address if it parses as one
    /// * `password` - Raw password candidate
    ///
    /// # Returns
    /// The id of the matching, non-deleted user. Unknown logins, wrong
    /// passwords and deleted accounts are indistinguishable to the caller.
    #[tracing::instrument(name = "AuthenticationService::authenticate", skip_all)]
    pub async fn authenticate(
        &self,
        cancel: &CancellationToken,
        login: &str,
        password: Secret<String>,
    ) -> Result<Uuid, AuthenticateError> {
        tracing::debug!("Authenticating user");

        let user = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Authentication cancelled");
                return Err(AuthenticateError::Cancelled);
            }
            result = self.find_user(login) => result?,
        };

        let candidate = user.as_ref().map(|u| u.password().clone());
        if !verify_password(candidate, password).await? {
            tracing::info!("Authentication failed: invalid credentials");
            return Err(AuthenticateError::InvalidCredentials);
        }

        match user {
            Some(user) if !user.is_deleted() => {
                tracing::info!(user_id = %user.id(), "User authenticated");
                Ok(user.id())
            }
            _ => {
                tracing::info!("Authentication failed: invalid credentials");
                Err(AuthenticateError::InvalidCredentials)
            }
        }
    }

    // Usernames may contain `@`, so a login that parses as an email falls back
    // to a username lookup when no user has that email.
    async fn find_user(&self, login: &str) -> Result<Option<User>, AuthenticateError> {
        if let Ok(email) = Email::parse(login) {
            if let Some(user) = found(self.user_store.find_by_email(&email).await)? {
                return Ok(Some(user));
            }
        }

        match Username::parse(login) {
            Ok(username) => found(self.user_store.find_by_username(&username).await),
            Err(_) => Ok(None),
        }
    }
}

fn found(result: Result<User, UserStoreError>) -> Result<Option<User>, AuthenticateError> {
    match result {
        Ok(user) => Ok(Some(user)),
        Err(UserStoreError::UserNotFound) => Ok(None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to look up user");
            Err(AuthenticateError::Internal)
        }
    }
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
async fn verify_password(
    expected: Option<Password>,
    candidate: Secret<String>,
) -> Result<bool, AuthenticateError> {
    let current_span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| match expected {
            Some(expected) => expected.compare(candidate.expose_secret()),
            None => {
                if let Some(dummy) = DUMMY_PASSWORD.as_ref() {
                    dummy.compare(candidate.expose_secret());
                }
                false
            }
        })
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        AuthenticateError::Internal
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // Mock user store holding a fixed set of users
    struct MockUserStore {
        users: Vec<User>,
        fail: bool,
    }

    impl MockUserStore {
        fn with(users: Vec<User>) -> Self {
            Self { users, fail: false }
        }
    }

    #[async_trait::async_trait]
    impl UserStore for MockUserStore {
        async fn append_user(&self, _user: User) -> Result<(), UserStoreError> {
            unimplemented!()
        }

        async fn find_by_username(&self, username: &Username) -> Result<User, UserStoreError> {
            if self.fail {
                return Err(UserStoreError::UnexpectedError("db down".to_owned()));
            }
            self.users
                .iter()
                .find(|u| u.username() == username)
                .cloned()
                .ok_or(UserStoreError::UserNotFound)
        }

        async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
            if self.fail {
                return Err(UserStoreError::UnexpectedError("db down".to_owned()));
            }
            self.users
                .iter()
                .find(|u| u.email() == email)
                .cloned()
                .ok_or(UserStoreError::UserNotFound)
        }
    }

    fn user(username: &str, email: &str, is_deleted: bool) -> User {
        let password = Password::parse(Secret::new("password123".to_owned())).unwrap();
        User::load(
            Uuid::new_v4(),
            Username::parse(username).unwrap(),
            Email::parse(email).unwrap(),
            password,
            Utc::now(),
            Utc::now(),
            None,
            is_deleted,
        )
    }

    fn alice(is_deleted: bool) -> User {
        user("alice", "alice@example.com", is_deleted)
    }

    fn secret(value: &str) -> Secret<String> {
        Secret::new(value.to_owned())
    }

    #[tokio::test]
    async fn test_authenticate_by_username_and_email() {
        let user = alice(false);
        let user_id = user.id();
        let service = AuthenticationService::new(MockUserStore::with(vec![user]));
        let cancel = CancellationToken::new();

        let by_username = service
            .authenticate(&cancel, "alice", secret("password123"))
            .await;
        let by_email = service
            .authenticate(&cancel, "alice@example.com", secret("password123"))
            .await;

        assert_eq!(by_username, Ok(user_id));
        assert_eq!(by_email, Ok(user_id));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let service = AuthenticationService::new(MockUserStore::with(vec![alice(false)]));
        let cancel = CancellationToken::new();

        let wrong_password = service
            .authenticate(&cancel, "alice", secret("password124"))
            .await;
        let unknown_user = service
            .authenticate(&cancel, "bob", secret("password123"))
            .await;
        let unparseable = service.authenticate(&cancel, "a b", secret("x")).await;

        assert_eq!(wrong_password, Err(AuthenticateError::InvalidCredentials));
        assert_eq!(unknown_user, Err(AuthenticateError::InvalidCredentials));
        assert_eq!(unparseable, Err(AuthenticateError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_deleted_user_cannot_authenticate() {
        let service = AuthenticationService::new(MockUserStore::with(vec![alice(true)]));

        let result = service
            .authenticate(&CancellationToken::new(), "alice", secret("password123"))
            .await;

        assert_eq!(result, Err(AuthenticateError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let service = AuthenticationService::new(MockUserStore {
            users: vec![],
            fail: true,
        });

        let result = service
            .authenticate(&CancellationToken::new(), "alice", secret("password123"))
            .await;

        assert_eq!(result, Err(AuthenticateError::Internal));
    }

    #[tokio::test]
    async fn test_cancelled_authentication() {
        let service = AuthenticationService::new(MockUserStore::with(vec![]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = service.authenticate(&cancel, "alice", secret("x")).await;

        assert_eq!(result, Err(AuthenticateError::Cancelled));
    }

    #[tokio::test]
    async fn test_username_shaped_like_an_email_can_log_in() {
        let bob = user("bob@home", "bob@example.com", false);
        let bob_id = bob.id();
        let service = AuthenticationService::new(MockUserStore::with(vec![bob]));
        let cancel = CancellationToken::new();

        let by_username = service
            .authenticate(&cancel, "bob@home", secret("password123"))
            .await;
        let by_email = service
            .authenticate(&cancel, "bob@example.com", secret("password123"))
            .await;

        assert_eq!(by_username, Ok(bob_id));
        assert_eq!(by_email, Ok(bob_id));
    }
}
