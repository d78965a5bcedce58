//! Flag list filter
//!
//! Raw query-string values validated into a typed filter. The SQL side lives
//! in `infra::postgres::push_flag_filter`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::domain::value_objects::{ContentType, FlagStatus, RuleCategory, Severity};
use crate::error::{ModerationError, ModerationResult};

const MAX_SEARCH_CHARS: usize = 100;

/// Query parameters as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagQuery {
    pub status: Option<String>,
    pub min_severity: Option<String>,
    pub content_type: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagFilter {
    pub status: Option<FlagStatus>,
    pub min_severity: Option<Severity>,
    pub content_type: Option<ContentType>,
    pub category: Option<RuleCategory>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

impl FlagFilter {
    pub fn parse(query: &FlagQuery) -> ModerationResult<Self> {
        let status = parse_enum(query.status.as_deref(), "status", FlagStatus::from_code)?;
        let min_severity =
            parse_enum(query.min_severity.as_deref(), "minSeverity", Severity::from_code)?;
        let content_type =
            parse_enum(query.content_type.as_deref(), "contentType", ContentType::from_code)?;
        let category = parse_enum(query.category.as_deref(), "category", RuleCategory::from_code)?;

        let from = parse_bound(query.from.as_deref(), "from", false)?;
        let to = parse_bound(query.to.as_deref(), "to", true)?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ModerationError::InvalidFilter(
                    "'from' must not be after 'to'".into(),
                ));
            }
        }

        let search = match non_empty(query.search.as_deref()) {
            Some(s) if s.chars().count() > MAX_SEARCH_CHARS => {
                return Err(ModerationError::InvalidFilter(format!(
                    "'search' must be at most {} characters",
                    MAX_SEARCH_CHARS
                )));
            }
            other => other.map(str::to_string),
        };

        Ok(Self {
            status,
            min_severity,
            content_type,
            category,
            from,
            to,
            search,
        })
    }

    /// Search text as an ILIKE pattern with wildcards escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_enum<T>(
    value: Option<&str>,
    field: &str,
    from_code: impl Fn(&str) -> Option<T>,
) -> ModerationResult<Option<T>> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => from_code(&raw.to_ascii_lowercase())
            .map(Some)
            .ok_or_else(|| ModerationError::InvalidFilter(format!("Unknown {}: {}", field, raw))),
    }
}

/// RFC 3339 timestamps as given; plain dates cover the whole day, so an
/// upper `YYYY-MM-DD` bound becomes the following midnight.
fn parse_bound(value: Option<&str>, field: &str, upper: bool) -> ModerationResult<Option<DateTime<Utc>>> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ModerationError::InvalidFilter(format!(
            "'{}' must be a date (YYYY-MM-DD) or RFC 3339 timestamp",
            field
        ))
    })?;
    let date = if upper { date.succ_opt().unwrap_or(date) } else { date };
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_query_is_unfiltered() {
        assert_eq!(FlagFilter::parse(&FlagQuery::default()).unwrap(), FlagFilter::default());
    }

    #[test]
    fn test_full_query() {
        let query = FlagQuery {
            status: Some("open".into()),
            min_severity: Some("HIGH".into()),
            content_type: Some("story".into()),
            category: Some("scam".into()),
            from: Some("2025-01-01".into()),
            to: Some("2025-01-31".into()),
            search: Some("  western union ".into()),
            ..Default::default()
        };
        let filter = FlagFilter::parse(&query).unwrap();
        assert_eq!(filter.status, Some(FlagStatus::Open));
        assert_eq!(filter.min_severity, Some(Severity::High));
        assert_eq!(filter.category, Some(RuleCategory::Scam));
        assert_eq!(filter.from, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.to, Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.search.as_deref(), Some("western union"));
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let query = FlagQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        let err = FlagFilter::parse(&query).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let query = FlagQuery {
            from: Some("2025-03-01".into()),
            to: Some("2025-02-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            FlagFilter::parse(&query),
            Err(ModerationError::InvalidFilter(_))
        ));

        let query = FlagQuery {
            from: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(FlagFilter::parse(&query).is_err());
    }

    #[test]
    fn test_equal_timestamp_bounds_accepted() {
        let query = FlagQuery {
            from: Some("2025-03-01T12:00:00Z".into()),
            to: Some("2025-03-01T12:00:00Z".into()),
            ..Default::default()
        };
        let filter = FlagFilter::parse(&query).unwrap();
        assert_eq!(filter.from, filter.to);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = FlagFilter {
            search: Some("100%_off".into()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%100\\%\\_off%"));
    }
}
