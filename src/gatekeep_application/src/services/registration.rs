use gatekeep_core::{
    DuplicateField, Email, Password, PasswordError, User, UserStore, UserStoreError, Username,
    ValidationErrors,
};
use secrecy::Secret;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error types returned by user registration
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("provided username is taken")]
    UsernameTaken,
    #[error("email is taken")]
    EmailTaken,
    #[error("registration was cancelled")]
    Cancelled,
    #[error("internal service error")]
    Internal,
}

/// Registration service - validates credentials and stores new users
pub struct RegistrationService<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> RegistrationService<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    /// Register a new user
    ///
    /// # Arguments
    /// * `cancel` - Aborts the registration before the user is stored
    /// * `username` - Raw username
    /// * `password` - Raw password, hashed before it goes anywhere
    /// * `email` - Raw email address
    ///
    /// # Returns
    /// Ok(()) once exactly one user is stored. Validation failures of all
    /// fields are reported together; storage details never leak.
    #[tracing::instrument(name = "RegistrationService::register", skip_all, fields(username = %username))]
    pub async fn register(
        &self,
        cancel: &CancellationToken,
        username: &str,
        password: Secret<String>,
        email: &str,
    ) -> Result<(), RegisterError> {
        tracing::debug!("Registering user");
        ensure_active(cancel)?;

        let username = Username::parse(username);
        let email = Email::parse(email);
        let password = match hash_password(password).await {
            Ok(password) => Ok(password),
            Err(PasswordError::Invalid(e)) => Err(e),
            Err(PasswordError::Hashing(e)) => {
                tracing::error!(error = %e, "Unexpected error creating password");
                return Err(RegisterError::Internal);
            }
        };

        let (username, email, password) = match (username, email, password) {
            (Ok(username), Ok(email), Ok(password)) => (username, email, password),
            (username, email, password) => {
                let errors: ValidationErrors = [username.err(), email.err(), password.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                tracing::warn!(%errors, "User registration input validation failed");
                return Err(RegisterError::Validation(errors));
            }
        };

        ensure_active(cancel)?;

        let user = User::new(username, email, password);
        let user_id = user.id();

        match self.user_store.append_user(user).await {
            Ok(()) => {
                tracing::info!(%user_id, "User registered successfully");
                Ok(())
            }
            Err(UserStoreError::Duplicate(DuplicateField::Email)) => {
                tracing::info!("User registration failed: email taken");
                Err(RegisterError::EmailTaken)
            }
            Err(UserStoreError::Duplicate(DuplicateField::Username)) => {
                tracing::info!("User registration failed: username taken");
                Err(RegisterError::UsernameTaken)
            }
            Err(UserStoreError::Duplicate(field)) => {
                tracing::error!(%field, "User registration failed: unhandled duplication field");
                Err(RegisterError::Internal)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to append user to the store");
                Err(RegisterError::Internal)
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), RegisterError> {
    if cancel.is_cancelled() {
        tracing::info!("User registration cancelled");
        return Err(RegisterError::Cancelled);
    }
    Ok(())
}

#[tracing::instrument(name = "Computing password hash", skip_all)]
async fn hash_password(raw: Secret<String>) -> Result<Password, PasswordError> {
    let current_span = tracing::Span::current();

    tokio::task::spawn_blocking(move || current_span.in_scope(|| Password::parse(raw)))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}
