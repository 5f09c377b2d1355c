pub mod access_claims;
pub mod email;
pub mod password;
pub mod refresh_token;
pub mod session;
pub mod user;
pub mod username;
pub mod validation_error;
