//! Admin purchase export filter

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::domain::value_objects::{PurchaseStatus, Tier};
use crate::error::{BillingError, BillingResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseExportQuery {
    pub status: Option<String>,
    pub tier: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseExportFilter {
    pub status: Option<PurchaseStatus>,
    pub tier: Option<Tier>,
    /// Inclusive, on `created_at`
    pub from: Option<DateTime<Utc>>,
    /// Exclusive
    pub to: Option<DateTime<Utc>>,
}

impl PurchaseExportFilter {
    pub fn parse(query: &PurchaseExportQuery) -> BillingResult<Self> {
        let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Some(
                PurchaseStatus::from_code(code)
                    .ok_or_else(|| BillingError::Validation(format!("Unknown status: {}", code)))?,
            ),
            None => None,
        };
        let tier = match query.tier.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Some(
                Tier::from_code(code)
                    .ok_or_else(|| BillingError::Validation(format!("Unknown tier: {}", code)))?,
            ),
            None => None,
        };
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(BillingError::Validation("'from' must not be after 'to'".into()));
            }
        }

        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        Ok(Self {
            status,
            tier,
            from: query.from.and_then(midnight),
            to: query.to.and_then(|d| d.succ_opt()).and_then(midnight),
        })
    }
}
