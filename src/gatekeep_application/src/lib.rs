pub mod access_token;
pub mod config;
pub mod services;

pub use access_token::{AccessTokenError, AccessTokenSigner};
pub use config::SessionConfig;
pub use services::{
    authentication::{AuthenticateError, AuthenticationService},
    registration::{RegisterError, RegistrationService},
    session::{SessionError, SessionService, TokenSet},
};
