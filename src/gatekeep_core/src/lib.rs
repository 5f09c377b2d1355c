pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    access_claims::AccessClaims,
    email::Email,
    password::{Password, PasswordError},
    refresh_token::{RefreshToken, TokenGenerationError},
    session::{ExpiryOutOfRange, Session},
    user::User,
    username::Username,
    validation_error::{Field, ValidationError, ValidationErrors},
};

pub use ports::repositories::{
    DuplicateField, SessionStore, SessionStoreError, UserStore, UserStoreError,
};
