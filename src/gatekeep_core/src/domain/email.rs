use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::validation_error::{Field, ValidationError};

const ATEXT: &str = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]";
const QUOTED_STRING: &str = r#""(?:[^"\\\r\n]|\\.)*""#;

static DOT_ATOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{ATEXT}+(?:\.{ATEXT}+)*$")).expect("valid regex"));

static ADDR_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    let dot_atom = format!(r"{ATEXT}+(?:\.{ATEXT}+)*");
    let domain_literal = r"\[[^\[\]\\\r\n]*\]";
    Regex::new(&format!(
        r"^(?P<local>{dot_atom}|{QUOTED_STRING})@(?P<domain>{dot_atom}|{domain_literal})$"
    ))
    .expect("valid regex")
});

// `Display Name <addr-spec>`; the phrase may mix atoms, dots and quoted words.
static NAME_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    let word = format!(r"(?:(?:{ATEXT}|\.)+|{QUOTED_STRING})");
    Regex::new(&format!(
        r"^(?:{word}(?:\s+{word})*\s*)?<(?P<addr>[^<>]+)>$"
    ))
    .expect("valid regex")
});

/// An RFC 5322 mailbox reduced to its bare `local@domain` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref().trim();

        let addr_spec = match NAME_ADDR.captures(value) {
            Some(captures) => captures
                .name("addr")
                .map(|m| m.as_str().trim())
                .unwrap_or_default(),
            None => value,
        };

        let captures = ADDR_SPEC.captures(addr_spec).ok_or_else(malformed)?;
        let (Some(local), Some(domain)) = (captures.name("local"), captures.name("domain")) else {
            return Err(malformed());
        };

        Ok(Self(format!(
            "{}@{}",
            canonical_local_part(local.as_str()),
            domain.as_str().to_ascii_lowercase()
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn malformed() -> ValidationError {
    ValidationError::new(Field::Email, "email is malformed")
}

// A quoted local part that is also a valid dot-atom is stored unquoted.
fn canonical_local_part(local: &str) -> String {
    let Some(inner) = local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return local.to_owned();
    };

    let mut unescaped = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            other => unescaped.push(other),
        }
    }

    if DOT_ATOM.is_match(&unescaped) {
        unescaped
    } else {
        local.to_owned()
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::internet::en::SafeEmail;

    #[test]
    fn test_plain_address() {
        let email = Email::parse("test@example.com").unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn test_display_name_is_stripped() {
        let email = Email::parse("Jane Doe <jane.doe@example.com>").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.com");
    }

    #[test]
    fn test_quoted_display_name_is_stripped() {
        let email = Email::parse(r#""Doe, Jane" <jane@example.com>"#).unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_angle_brackets_without_name() {
        let email = Email::parse("  <jane@example.com>  ").unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_domain_is_lowercased() {
        let email = Email::parse("Jane@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Jane@example.com");
    }

    #[test]
    fn test_redundant_quotes_are_removed() {
        let email = Email::parse(r#""jane"@example.com"#).unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_quoted_local_part_with_space_is_kept() {
        let email = Email::parse(r#""jane doe"@example.com"#).unwrap();
        assert_eq!(email.as_str(), r#""jane doe"@example.com"#);
    }

    #[test]
    fn test_single_label_domain_is_accepted() {
        assert!(Email::parse("root@localhost").is_ok());
    }

    #[test]
    fn test_malformed_addresses_are_rejected() {
        let cases = [
            "",
            "plainaddress",
            "@example.com",
            "jane@",
            "jane@@example.com",
            "jane doe@example.com",
            "jane..doe@example.com",
            ".jane@example.com",
            "jane@example..com",
            "Jane <jane@example.com",
            "<jane@example.com> trailing",
        ];

        for case in cases {
            let err = Email::parse(case).unwrap_err();
            assert_eq!(err.field, Field::Email, "{case}");
        }
    }

    #[test]
    fn test_fake_addresses_are_accepted_and_stable() {
        for _ in 0..50 {
            let address: String = SafeEmail().fake();
            let email = Email::parse(&address).unwrap();
            assert!(address.eq_ignore_ascii_case(email.as_str()));
            assert_eq!(Email::parse(email.as_str()).unwrap(), email);
        }
    }
}
