use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;

const TOKEN_BYTES: usize = 32;
const LOG_PREFIX_LEN: usize = 4;

#[derive(Debug, Error)]
#[error("Failed to read from the OS random source: {0}")]
pub struct TokenGenerationError(String);

/// Opaque credential identifying a session.
///
/// `Debug` only shows a short prefix so tokens can appear in logs without
/// becoming usable from them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// 32 bytes from the OS random source, URL-safe base64 without padding.
    pub fn generate() -> Result<Self, TokenGenerationError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenGenerationError(e.to_string()))?;

        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap a token received from a client or loaded from storage.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(LOG_PREFIX_LEN)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefreshToken({}…)", self.prefix())
    }
}

impl AsRef<str> for RefreshToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RefreshToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}
