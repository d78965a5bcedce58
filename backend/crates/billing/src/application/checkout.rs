//! Checkout Use Case
//!
//! Opens a pending purchase. The provider reference returned here is what
//! the payment provider echoes back in its webhook.

use std::sync::Arc;

use kernel::AuthContext;
use kernel::audit::{AuditEvent, AuditHandle};

use crate::domain::entities::Purchase;
use crate::domain::repository::PurchaseRepository;
use crate::domain::value_objects::{PaymentProvider, Tier};
use crate::error::{BillingError, BillingResult};

pub struct CheckoutInput {
    pub tier: String,
    pub provider: Option<String>,
    pub ip: Option<String>,
}

pub struct CheckoutUseCase<R>
where
    R: PurchaseRepository,
{
    repo: Arc<R>,
    audit: AuditHandle,
}

impl<R> CheckoutUseCase<R>
where
    R: PurchaseRepository,
{
    pub fn new(repo: Arc<R>, audit: AuditHandle) -> Self {
        Self { repo, audit }
    }

    pub async fn execute(&self, ctx: &AuthContext, input: CheckoutInput) -> BillingResult<Purchase> {
        let tier = Tier::from_code(input.tier.trim())
            .ok_or_else(|| BillingError::Validation(format!("Unknown tier: {}", input.tier)))?;
        if !tier.is_paid() {
            return Err(BillingError::Validation("The free tier needs no checkout".into()));
        }

        let provider = match input.provider.as_deref().map(str::trim) {
            None | Some("") => PaymentProvider::Stripe,
            Some(code) => PaymentProvider::from_code(code)
                .ok_or_else(|| BillingError::Validation(format!("Unknown provider: {}", code)))?,
        };

        let provider_ref = format!("{}_{}", provider.code(), uuid::Uuid::new_v4().simple());
        let purchase = Purchase::pending(ctx.user_id, tier, provider, provider_ref);
        self.repo.create(&purchase).await?;

        tracing::info!(
            purchase_id = %purchase.purchase_id,
            user_id = %ctx.user_id,
            tier = %tier,
            "Checkout started"
        );
        self.audit.record(
            AuditEvent::new("purchase.checkout_started", "purchase")
                .actor(ctx.user_id)
                .target(purchase.purchase_id)
                .metadata(serde_json::json!({
                    "tier": tier.code(),
                    "provider": provider.code(),
                    "amount_cents": purchase.amount_cents,
                }))
                .ip(input.ip),
        );

        Ok(purchase)
    }
}
