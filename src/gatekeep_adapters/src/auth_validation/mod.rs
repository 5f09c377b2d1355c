pub mod local_access_token_validator;

pub use local_access_token_validator::{LocalAccessTokenValidator, TokenAuthError};
