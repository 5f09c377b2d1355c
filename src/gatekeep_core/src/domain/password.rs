use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use super::validation_error::{Field, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_CHARACTER_CLASSES: usize = 2;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// Argon2id hash of a user password in PHC string format.
///
/// The raw password only exists for the duration of [`Password::parse`]; after
/// that the hash is the only representation that is stored or compared.
#[derive(Clone)]
pub struct Password {
    hash: Secret<String>,
}

impl Password {
    /// Validate a raw password and hash it with a fresh random salt.
    ///
    /// Hashing is CPU bound; async callers should run this on the blocking pool.
    pub fn parse(raw: Secret<String>) -> Result<Self, PasswordError> {
        validate(raw.expose_secret())?;

        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = hasher()
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
            .hash_password(raw.expose_secret().as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(Self {
            hash: Secret::new(hash.to_string()),
        })
    }

    /// Wrap a hash loaded from storage. No validation is performed.
    pub fn from_hash(hash: Secret<String>) -> Self {
        Self { hash }
    }

    /// Verify `candidate` against the stored hash.
    pub fn compare(&self, candidate: &str) -> bool {
        let Ok(expected) = PasswordHash::new(self.hash.expose_secret()) else {
            return false;
        };
        let Ok(verifier) = hasher() else {
            return false;
        };

        verifier
            .verify_password(candidate.as_bytes(), &expected)
            .is_ok()
    }

    pub fn hash(&self) -> &Secret<String> {
        &self.hash
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

fn hasher() -> Result<Argon2<'static>, argon2::Error> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None)?,
    ))
}

fn validate(raw: &str) -> Result<(), ValidationError> {
    if raw.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            Field::Password,
            format!("should be at least {MIN_PASSWORD_LENGTH} characters long"),
        ));
    }

    let classes = [
        raw.chars().any(char::is_lowercase),
        raw.chars().any(char::is_uppercase),
        raw.chars().any(char::is_numeric),
    ];

    if classes.iter().filter(|present| **present).count() < MIN_CHARACTER_CLASSES {
        return Err(ValidationError::new(
            Field::Password,
            "should contain at least two types of characters: lowercase, uppercase, digits",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn secret(value: &str) -> Secret<String> {
        Secret::new(value.to_owned())
    }

    #[test]
    fn test_password_hash_and_compare() {
        let password = Password::parse(secret("password123")).unwrap();

        assert!(password.compare("password123"));
        assert!(!password.compare("password124"));
        assert!(!password.compare(""));
    }

    #[test]
    fn test_hash_is_phc_argon2id() {
        let password = Password::parse(secret("Secret42")).unwrap();
        assert!(password.hash().expose_secret().starts_with("$argon2id$"));
        assert_ne!(password.hash().expose_secret(), "Secret42");
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = Password::parse(secret("SamePass1")).unwrap();
        let second = Password::parse(secret("SamePass1")).unwrap();

        assert_ne!(first.hash().expose_secret(), second.hash().expose_secret());
        assert!(first.compare("SamePass1"));
        assert!(second.compare("SamePass1"));
    }

    #[test]
    fn test_from_hash_restores_comparison() {
        let password = Password::parse(secret("UPPERlower")).unwrap();
        let restored = Password::from_hash(password.hash().clone());

        assert!(restored.compare("UPPERlower"));
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        let password = Password::from_hash(secret("not-a-phc-string"));
        assert!(!password.compare("not-a-phc-string"));
    }

    #[test]
    fn test_too_short_password_is_rejected() {
        let err = Password::parse(secret("ab1")).unwrap_err();
        assert!(matches!(err, PasswordError::Invalid(e) if e.field == Field::Password));
    }

    #[test]
    fn test_single_character_class_is_rejected() {
        for raw in ["abcdefgh", "ABCDEFGH", "12345678", "!!!!!!!!"] {
            let err = Password::parse(secret(raw)).unwrap_err();
            assert!(
                matches!(err, PasswordError::Invalid(ref e) if e.field == Field::Password),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_non_ascii_digits_count_as_digits() {
        // Arabic-Indic and Devanagari digits
        for raw in ["abcdef\u{0663}", "abcdef\u{0967}\u{0968}"] {
            let password = Password::parse(secret(raw)).unwrap();
            assert!(password.compare(raw));
        }
    }

    #[test]
    fn test_debug_does_not_leak_hash() {
        let password = Password::from_hash(secret("$argon2id$v=19$secret"));
        assert!(!format!("{password:?}").contains("argon2id"));
    }

    #[quickcheck]
    fn prop_short_passwords_are_rejected(raw: String) -> TestResult {
        if raw.chars().count() >= MIN_PASSWORD_LENGTH {
            return TestResult::discard();
        }
        TestResult::from_bool(matches!(
            Password::parse(Secret::new(raw)),
            Err(PasswordError::Invalid(e)) if e.field == Field::Password
        ))
    }

    #[quickcheck]
    fn prop_lowercase_only_passwords_are_rejected(raw: String) -> bool {
        let raw: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .chain("abcdef".chars())
            .collect();
        matches!(
            Password::parse(Secret::new(raw)),
            Err(PasswordError::Invalid(e)) if e.field == Field::Password
        )
    }
}
