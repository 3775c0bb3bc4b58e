//! Email address types.

use crate::{MailError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// The email address.
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl Address {
    /// Create a new address with just an email.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into().trim().to_string();
        validate_email(&email)?;
        Ok(Self { email, name: None })
    }

    /// Create a new address with a display name.
    ///
    /// A blank name is treated as no name at all.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let mut address = Self::new(email)?;
        let name = name.into();
        let name = name.trim();
        if !name.is_empty() {
            address.name = Some(name.to_string());
        }
        Ok(address)
    }

    /// Get the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Get the display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name, or an empty string when there is none.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if needs_quoting(name) => {
                f.write_str("\"")?;
                for c in name.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "\" <{}>", self.email)
            }
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

/// RFC 5322 specials force a display name into a quoted string.
fn needs_quoting(name: &str) -> bool {
    name.chars().any(|c| {
        matches!(c, ',' | ';' | ':' | '<' | '>' | '@' | '"' | '(' | ')' | '[' | ']' | '\\' | '.')
    })
}

/// Validate an email address (basic validation).
fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(MailError::InvalidAddress(
            "Email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(MailError::InvalidAddress(format!(
            "Invalid email format: {}",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(MailError::InvalidAddress(format!(
            "Invalid email format: {}",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(MailError::InvalidAddress(format!(
            "Invalid domain in email: {}",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let addr = Address::new("test@example.com").unwrap();
        assert_eq!(format!("{}", addr), "test@example.com");

        let addr = Address::with_name("test@example.com", "John").unwrap();
        assert_eq!(format!("{}", addr), "John <test@example.com>");
    }

    #[test]
    fn test_display_quotes_specials() {
        let addr = Address::with_name("john@example.com", "Doe, John").unwrap();
        assert_eq!(addr.to_string(), r#""Doe, John" <john@example.com>"#);

        let addr = Address::with_name("j@example.com", r#"J. "Jay" \ Doe"#).unwrap();
        assert_eq!(addr.to_string(), r#""J. \"Jay\" \\ Doe" <j@example.com>"#);
    }

    #[test]
    fn test_blank_name_is_dropped() {
        let addr = Address::with_name("test@example.com", "   ").unwrap();
        assert!(addr.name().is_none());
        assert_eq!(addr.name_or_empty(), "");
    }

    #[test]
    fn test_invalid_email() {
        assert!(Address::new("").is_err());
        assert!(Address::new("invalid").is_err());
        assert!(Address::new("@example.com").is_err());
        assert!(Address::new("test@").is_err());
        assert!(Address::new("a@b@example.com").is_err());
        assert!(Address::new("test@localhost").is_err());
    }
}
