use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a signed access token.
///
/// `exp` and `iat` are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}
