use chrono::Duration;
use secrecy::Secret;

/// Immutable settings a [`SessionService`](crate::SessionService) is built with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Attempts at finding an unused refresh token before giving up.
    pub max_token_retries: u32,
    /// Lifetime of a refresh token, counted from creation or last refresh.
    pub session_duration: Duration,
    pub access_token_duration: Duration,
    /// HS256 key shared with every party that verifies access tokens.
    pub token_secret: Secret<String>,
}
