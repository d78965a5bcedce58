//! Payment Webhook Use Case
//!
//! Verifies the provider signature over the raw body, then applies the
//! event to the purchase it references. Replays are acknowledged without
//! effect.

use std::sync::Arc;

use chrono::Utc;
use kernel::audit::{AuditEvent, AuditHandle};
use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use platform::webhook::WebhookVerifier;
use serde::Serialize;
use serde_json::json;

use crate::domain::entities::Purchase;
use crate::domain::events::{PaymentEvent, PaymentEventKind};
use crate::domain::pricing::plan;
use crate::domain::repository::{AccountDirectory, PurchaseRepository};
use crate::domain::value_objects::PurchaseStatus;
use crate::error::{BillingError, BillingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Applied,
    /// Already in the target state
    Duplicate,
    /// Event type not handled
    Ignored,
}

pub struct HandleWebhookUseCase<R, M>
where
    R: PurchaseRepository + AccountDirectory,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    verifier: Arc<WebhookVerifier>,
    audit: AuditHandle,
}

impl<R, M> HandleWebhookUseCase<R, M>
where
    R: PurchaseRepository + AccountDirectory + Sync,
    M: Mailer + Sync,
{
    pub fn new(
        repo: Arc<R>,
        mailer: Arc<M>,
        verifier: Arc<WebhookVerifier>,
        audit: AuditHandle,
    ) -> Self {
        Self {
            repo,
            mailer,
            verifier,
            audit,
        }
    }

    pub async fn execute(&self, signature: Option<&str>, body: &[u8]) -> BillingResult<WebhookOutcome> {
        let signature = signature.ok_or(BillingError::MissingSignature)?;
        self.verifier.verify(signature, body)?;

        let event: PaymentEvent = serde_json::from_slice(body)
            .map_err(|e| BillingError::InvalidPayload(e.to_string()))?;

        let kind = event.kind();
        if let PaymentEventKind::Other(event_type) = &kind {
            tracing::info!(event_type = %event_type, "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored);
        }

        let mut purchase = self
            .repo
            .find_by_provider_ref(&event.data.provider_ref)
            .await?
            .ok_or(BillingError::PurchaseNotFound)?;

        let target = match kind {
            PaymentEventKind::Completed => PurchaseStatus::Completed,
            PaymentEventKind::Refunded => PurchaseStatus::Refunded,
            PaymentEventKind::Failed => PurchaseStatus::Failed,
            PaymentEventKind::Other(_) => return Ok(WebhookOutcome::Ignored),
        };
        if purchase.status == target {
            return Ok(WebhookOutcome::Duplicate);
        }

        let expected = purchase.status;
        let now = Utc::now();
        match (expected, target) {
            (PurchaseStatus::Pending, PurchaseStatus::Completed) => {
                check_amount(&purchase, &event)?;
                purchase.complete(now);
            }
            (PurchaseStatus::Pending, PurchaseStatus::Failed) => purchase.fail(now),
            (PurchaseStatus::Completed, PurchaseStatus::Refunded) => purchase.refund(now),
            (from, to) => return Err(BillingError::InvalidTransition { from, to }),
        }

        if !self.repo.transition(&purchase, expected).await? {
            return Ok(WebhookOutcome::Duplicate);
        }

        tracing::info!(
            purchase_id = %purchase.purchase_id,
            event_id = event.id.as_deref().unwrap_or("-"),
            status = %purchase.status,
            "Purchase updated from webhook"
        );
        self.audit.record(
            AuditEvent::new(format!("purchase.{}", purchase.status.code()), "purchase")
                .actor(purchase.user_id)
                .target(purchase.purchase_id)
                .metadata(json!({
                    "tier": purchase.tier.code(),
                    "provider_ref": purchase.provider_ref,
                    "event_id": event.id,
                })),
        );

        if purchase.status == PurchaseStatus::Completed {
            self.send_receipt(&purchase).await;
        }

        Ok(WebhookOutcome::Applied)
    }

    async fn send_receipt(&self, purchase: &Purchase) {
        let contact = match self.repo.contact(&purchase.user_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not look up purchaser");
                return;
            }
        };

        let message = EmailMessage::new(contact.email, EmailTemplate::PurchaseReceipt, contact.language.code())
            .with_data(json!({
                "purchase_id": purchase.purchase_id.to_string(),
                "plan": plan(purchase.tier).name,
                "amount": format!("{}.{:02} {}", purchase.amount_cents / 100, purchase.amount_cents % 100, purchase.currency),
                "expires_at": purchase.expires_at.map(|t| t.date_naive().to_string()),
            }));
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(error = %e, purchase_id = %purchase.purchase_id, "Receipt email failed");
        }
    }
}

fn check_amount(purchase: &Purchase, event: &PaymentEvent) -> BillingResult<()> {
    let price = plan(purchase.tier).price_cents;
    let paid = event.data.amount_cents.unwrap_or(0);
    let currency = event
        .data
        .currency
        .as_deref()
        .unwrap_or(&purchase.currency)
        .to_ascii_uppercase();

    if paid != price || currency != purchase.currency {
        return Err(BillingError::AmountMismatch {
            tier: purchase.tier,
            paid,
            currency,
        });
    }
    Ok(())
}
