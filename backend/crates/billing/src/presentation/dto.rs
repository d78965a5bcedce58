//! API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Purchase;
use crate::domain::entitlement::{Entitlement, QuotaStatus};
use crate::domain::pricing::PlanSpec;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub tier: String,
    /// `stripe` (default) or `paypal`
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: String,
    pub tier: &'static str,
    pub provider: &'static str,
    pub provider_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(p: Purchase) -> Self {
        Self {
            id: p.purchase_id.to_string(),
            tier: p.tier.code(),
            provider: p.provider.code(),
            provider_ref: p.provider_ref,
            amount_cents: p.amount_cents,
            currency: p.currency,
            status: p.status.code(),
            created_at: p.created_at,
            purchased_at: p.purchased_at,
            expires_at: p.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    pub tier: &'static str,
    pub purchase_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub plan: &'static PlanSpec,
    pub forms: QuotaStatus,
    pub prompts: QuotaStatus,
}

impl EntitlementResponse {
    pub fn new(entitlement: Entitlement, forms: QuotaStatus, prompts: QuotaStatus) -> Self {
        Self {
            tier: entitlement.tier.code(),
            purchase_id: entitlement.purchase_id.map(|id| id.to_string()),
            starts_at: entitlement.starts_at,
            expires_at: entitlement.expires_at,
            plan: entitlement.plan(),
            forms,
            prompts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub outcome: crate::application::WebhookOutcome,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
