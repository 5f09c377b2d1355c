use std::fmt;

use super::validation_error::{Field, ValidationError};

const MIN_USERNAME_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.chars().count() < MIN_USERNAME_LENGTH {
            return Err(ValidationError::new(
                Field::Username,
                format!("should be at least {MIN_USERNAME_LENGTH} characters long"),
            ));
        }

        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::new(
                Field::Username,
                "should not contain whitespace",
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
