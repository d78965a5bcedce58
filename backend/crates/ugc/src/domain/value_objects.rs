//! Domain Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::{UgcError, UgcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    #[default]
    Pending,
    Published,
    Flagged,
    Rejected,
}

impl StoryStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            StoryStatus::Pending => "pending",
            StoryStatus::Published => "published",
            StoryStatus::Flagged => "flagged",
            StoryStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(StoryStatus::Pending),
            "published" => Some(StoryStatus::Published),
            "flagged" => Some(StoryStatus::Flagged),
            "rejected" => Some(StoryStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_public(&self) -> bool {
        *self == StoryStatus::Published
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// NFKC, trimmed
fn normalize(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_string()
}

fn check_length(value: &str, field: &str, min: usize, max: usize) -> UgcResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(UgcError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryTitle(String);

impl StoryTitle {
    pub const MIN_CHARS: usize = 5;
    pub const MAX_CHARS: usize = 150;

    pub fn parse(raw: &str) -> UgcResult<Self> {
        let title = normalize(raw)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        check_length(&title, "Title", Self::MIN_CHARS, Self::MAX_CHARS)?;
        if title.chars().any(char::is_control) {
            return Err(UgcError::Validation("Title contains invalid characters".into()));
        }
        Ok(Self(title))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBody(String);

impl StoryBody {
    pub const MIN_CHARS: usize = 50;
    pub const MAX_CHARS: usize = 20_000;

    pub fn parse(raw: &str) -> UgcResult<Self> {
        let body: String = normalize(raw)
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
            .collect();
        check_length(&body, "Body", Self::MIN_CHARS, Self::MAX_CHARS)?;
        Ok(Self(body))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`, at most 60 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySlug(String);

impl CategorySlug {
    pub const MAX_CHARS: usize = 60;

    pub fn parse(raw: &str) -> UgcResult<Self> {
        let slug = raw.trim();
        let valid = !slug.is_empty()
            && slug.len() <= Self::MAX_CHARS
            && slug
                .split('-')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        if !valid {
            return Err(UgcError::Validation(
                "Slug must be lowercase letters and digits separated by single hyphens".into(),
            ));
        }
        Ok(Self(slug.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO 3166-1 alpha-2, upper-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> UgcResult<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(UgcError::Validation(format!(
                "Invalid country code: {}",
                raw.trim()
            )));
        }
        Ok(Self(code))
    }

    /// Blank input is treated as absent
    pub fn parse_optional(raw: Option<&str>) -> UgcResult<Option<Self>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Self::parse(s).map(Some),
            None => Ok(None),
        }
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
