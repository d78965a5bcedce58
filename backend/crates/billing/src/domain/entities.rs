//! Domain Entities

use chrono::{DateTime, Duration, Utc};
use kernel::id::{PurchaseId, UsageLogId, UserId};

use crate::domain::pricing::{CURRENCY, plan};
use crate::domain::value_objects::{PaymentProvider, PurchaseStatus, Tier, UsageKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub purchase_id: PurchaseId,
    pub user_id: UserId,
    pub tier: Tier,
    pub provider: PaymentProvider,
    /// Checkout reference echoed back by the provider; unique
    pub provider_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    /// Set when the payment completes
    pub purchased_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// A pending purchase priced from the pricing table
    pub fn pending(user_id: UserId, tier: Tier, provider: PaymentProvider, provider_ref: String) -> Self {
        let now = Utc::now();
        Self {
            purchase_id: PurchaseId::new(),
            user_id,
            tier,
            provider,
            provider_ref,
            amount_cents: plan(tier).price_cents,
            currency: CURRENCY.to_string(),
            status: PurchaseStatus::Pending,
            created_at: now,
            purchased_at: None,
            expires_at: None,
            updated_at: now,
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = PurchaseStatus::Completed;
        self.purchased_at = Some(at);
        self.expires_at = plan(self.tier)
            .access_days
            .map(|days| at + Duration::days(i64::from(days)));
        self.updated_at = at;
    }

    pub fn refund(&mut self, at: DateTime<Utc>) {
        self.status = PurchaseStatus::Refunded;
        self.updated_at = at;
    }

    pub fn fail(&mut self, at: DateTime<Utc>) {
        self.status = PurchaseStatus::Failed;
        self.updated_at = at;
    }

    /// Completed and not yet expired
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PurchaseStatus::Completed && self.expires_at.is_none_or(|exp| exp > now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageLog {
    pub usage_log_id: UsageLogId,
    pub user_id: UserId,
    pub kind: UsageKind,
    /// Agent code for AI prompts
    pub agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UsageLog {
    pub fn new(user_id: UserId, kind: UsageKind, agent: Option<String>) -> Self {
        Self {
            usage_log_id: UsageLogId::new(),
            user_id,
            kind,
            agent,
            created_at: Utc::now(),
        }
    }
}
