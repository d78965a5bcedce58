//! Entitlement and quota arithmetic

use chrono::{DateTime, Datelike, TimeZone, Utc};
use kernel::id::PurchaseId;
use serde::Serialize;

use crate::domain::entities::Purchase;
use crate::domain::pricing::{PlanSpec, plan};
use crate::domain::value_objects::{Tier, UsageKind};

/// What a user may currently do
#[derive(Debug, Clone, PartialEq)]
pub struct Entitlement {
    pub tier: Tier,
    /// Purchase granting the tier; `None` for free
    pub purchase_id: Option<PurchaseId>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entitlement {
    pub fn free() -> Self {
        Self {
            tier: Tier::Free,
            purchase_id: None,
            starts_at: None,
            expires_at: None,
        }
    }

    /// Highest-ranked purchase that grants access at `now`; ties go to the
    /// later expiry.
    pub fn resolve(purchases: &[Purchase], now: DateTime<Utc>) -> Self {
        purchases
            .iter()
            .filter(|p| p.grants_access_at(now))
            .max_by(|a, b| {
                a.tier
                    .cmp(&b.tier)
                    .then_with(|| a.expires_at.cmp(&b.expires_at))
            })
            .map(|p| Self {
                tier: p.tier,
                purchase_id: Some(p.purchase_id),
                starts_at: p.purchased_at,
                expires_at: p.expires_at,
            })
            .unwrap_or_else(Self::free)
    }

    pub fn plan(&self) -> &'static PlanSpec {
        plan(self.tier)
    }

    pub fn quota(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::FormGeneration => self.plan().form_quota,
            UsageKind::AiPrompt => self.plan().monthly_prompt_quota,
        }
    }

    /// Start of the counting window; `None` counts over all time
    pub fn window_start(&self, kind: UsageKind, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match kind {
            UsageKind::FormGeneration => self.starts_at,
            UsageKind::AiPrompt => Some(month_start(now)),
        }
    }

    /// When the count starts over; `None` if it never does
    pub fn resets_at(&self, kind: UsageKind, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match kind {
            UsageKind::FormGeneration => self.expires_at,
            UsageKind::AiPrompt => next_month_start(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub kind: UsageKind,
    pub tier: Tier,
    pub quota: u32,
    pub used: i64,
    pub remaining: i64,
    pub resets_at: Option<DateTime<Utc>>,
}

impl QuotaStatus {
    pub fn new(entitlement: &Entitlement, kind: UsageKind, used: i64, now: DateTime<Utc>) -> Self {
        let quota = entitlement.quota(kind);
        Self {
            kind,
            tier: entitlement.tier,
            quota,
            used,
            remaining: (i64::from(quota) - used).max(0),
            resets_at: entitlement.resets_at(kind, now),
        }
    }

    pub fn allowed(&self) -> bool {
        self.remaining > 0
    }

    /// The status after one more unit is used
    pub fn after_use(mut self) -> Self {
        self.used += 1;
        self.remaining = (self.remaining - 1).max(0);
        self
    }
}

/// Midnight UTC on the first of `now`'s month
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn next_month_start(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}
