//! Display Name Value Object
//!
//! Shown next to published stories. Any script is allowed; the value is
//! NFKC-normalised and inner whitespace collapsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AuthError, AuthResult};

pub const DISPLAY_NAME_MIN_LENGTH: usize = 2;
pub const DISPLAY_NAME_MAX_LENGTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let normalized: String = raw.nfkc().collect();
        let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.chars().any(char::is_control) {
            return Err(AuthError::Validation(
                "Display name contains invalid characters".into(),
            ));
        }

        let len = collapsed.chars().count();
        if !(DISPLAY_NAME_MIN_LENGTH..=DISPLAY_NAME_MAX_LENGTH).contains(&len) {
            return Err(AuthError::Validation(format!(
                "Display name must be {}-{} characters",
                DISPLAY_NAME_MIN_LENGTH, DISPLAY_NAME_MAX_LENGTH
            )));
        }

        Ok(Self(collapsed))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_whitespace_and_width() {
        let name = DisplayName::parse("  Ｍaria   José ").unwrap();
        assert_eq!(name.as_str(), "Maria José");
    }

    #[test]
    fn test_length_bounds() {
        assert!(DisplayName::parse("A").is_err());
        assert!(DisplayName::parse("Li").is_ok());
        assert!(DisplayName::parse(&"x".repeat(61)).is_err());
        assert!(DisplayName::parse("نور الهدى").is_ok());
    }
}
