//! Story list and export filters

use chrono::{DateTime, NaiveDate, Utc};
use kernel::Language;
use serde::Deserialize;

use crate::domain::value_objects::{CategorySlug, CountryCode, StoryStatus};
use crate::error::{UgcError, UgcResult};

const MAX_SEARCH_CHARS: usize = 100;

/// `GET /api/stories` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub search: Option<String>,
}

/// Public listing filter; only published stories are ever listed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryFilter {
    pub language: Option<Language>,
    pub category: Option<CategorySlug>,
    /// Matches origin or destination
    pub country: Option<CountryCode>,
    pub search: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl StoryFilter {
    pub fn parse(query: &StoryQuery) -> UgcResult<Self> {
        let language = match present(query.language.as_deref()) {
            Some(code) => Some(Language::from_code(code).ok_or_else(|| {
                UgcError::Validation(format!("Unsupported language: {}", code))
            })?),
            None => None,
        };
        let category = present(query.category.as_deref())
            .map(CategorySlug::parse)
            .transpose()?;
        let country = CountryCode::parse_optional(query.country.as_deref())?;

        let search = present(query.search.as_deref()).map(str::to_string);
        if search.as_ref().is_some_and(|s| s.chars().count() > MAX_SEARCH_CHARS) {
            return Err(UgcError::Validation(format!(
                "Search must be at most {} characters",
                MAX_SEARCH_CHARS
            )));
        }

        Ok(Self {
            language,
            category,
            country,
            search,
        })
    }

    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| like_pattern(s))
    }
}

/// `%term%` with LIKE wildcards escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Admin export query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportFilter {
    pub status: Option<StoryStatus>,
    /// Inclusive
    pub from: Option<DateTime<Utc>>,
    /// Exclusive (the day after `to`)
    pub to: Option<DateTime<Utc>>,
}

impl ExportFilter {
    pub fn parse(query: &ExportQuery) -> UgcResult<Self> {
        let status = match present(query.status.as_deref()) {
            Some(code) => Some(StoryStatus::from_code(code).ok_or_else(|| {
                UgcError::Validation(format!("Unknown status: {}", code))
            })?),
            None => None,
        };
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(UgcError::Validation("'from' must not be after 'to'".into()));
            }
        }

        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        Ok(Self {
            status,
            from: query.from.and_then(midnight),
            to: query.to.and_then(|d| d.succ_opt()).and_then(midnight),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_filter_parse() {
        let filter = StoryFilter::parse(&StoryQuery {
            language: Some("es".into()),
            category: Some("work-visas".into()),
            country: Some("mx".into()),
            search: Some(" first job ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.language, Some(Language::Es));
        assert_eq!(filter.country.as_ref().unwrap().as_str(), "MX");
        assert_eq!(filter.search_pattern().as_deref(), Some("%first job%"));
    }

    #[test]
    fn test_story_filter_rejects_unknown_language() {
        let err = StoryFilter::parse(&StoryQuery {
            language: Some("xx".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_export_filter_range() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1);
        let to = NaiveDate::from_ymd_opt(2025, 1, 31);
        let filter = ExportFilter::parse(&ExportQuery {
            status: Some("published".into()),
            from,
            to,
        })
        .unwrap();
        assert_eq!(filter.status, Some(StoryStatus::Published));
        assert_eq!(
            filter.to.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );

        assert!(ExportFilter::parse(&ExportQuery {
            status: None,
            from: to,
            to: from,
        })
        .is_err());
    }
}
