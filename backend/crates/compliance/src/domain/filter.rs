//! Admin list filters

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::UserId;
use serde::Deserialize;

use crate::domain::value_objects::{DsarKind, DsarStatus};
use crate::error::{ComplianceError, ComplianceResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DsarListQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub overdue: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DsarFilter {
    pub status: Option<DsarStatus>,
    pub kind: Option<DsarKind>,
    /// Open requests whose due date is before this instant
    pub overdue_at: Option<DateTime<Utc>>,
}

impl DsarFilter {
    pub fn parse(query: &DsarListQuery, now: DateTime<Utc>) -> ComplianceResult<Self> {
        let status = match non_empty(&query.status) {
            Some(code) => Some(
                DsarStatus::from_code(code)
                    .ok_or_else(|| ComplianceError::Validation(format!("Unknown status: {}", code)))?,
            ),
            None => None,
        };
        let kind = match non_empty(&query.kind) {
            Some(code) => Some(
                DsarKind::from_code(code)
                    .ok_or_else(|| ComplianceError::Validation(format!("Unknown request kind: {}", code)))?,
            ),
            None => None,
        };
        Ok(Self {
            status,
            kind,
            overdue_at: query.overdue.unwrap_or(false).then_some(now),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub actor_id: Option<UserId>,
    /// Exact action, or a prefix when it ends with `.`
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    /// Exclusive
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn parse(query: &AuditQuery) -> ComplianceResult<Self> {
        let actor_id = match non_empty(&query.actor_id) {
            Some(raw) => Some(
                raw.parse::<UserId>()
                    .map_err(|_| ComplianceError::Validation(format!("Invalid actor id: {}", raw)))?,
            ),
            None => None,
        };
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(ComplianceError::Validation("'from' must not be after 'to'".into()));
            }
        }

        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        Ok(Self {
            actor_id,
            action: non_empty(&query.action).map(str::to_string),
            target_type: non_empty(&query.target_type).map(str::to_string),
            target_id: non_empty(&query.target_id).map(str::to_string),
            from: query.from.and_then(midnight),
            to: query.to.and_then(|d| d.succ_opt()).and_then(midnight),
        })
    }

    pub fn action_is_prefix(&self) -> bool {
        self.action.as_deref().is_some_and(|a| a.ends_with('.'))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
