//! Access Control Use Case
//!
//! Resolves a user's entitlement from their purchases and meters usage
//! against the plan's quotas.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::domain::entities::UsageLog;
use crate::domain::entitlement::{Entitlement, QuotaStatus};
use crate::domain::ports::QuotaGate;
use crate::domain::repository::{PurchaseRepository, UsageRepository};
use crate::domain::value_objects::UsageKind;
use crate::error::{BillingError, BillingResult};

pub struct AccessControlUseCase<R>
where
    R: PurchaseRepository + UsageRepository,
{
    repo: Arc<R>,
}

impl<R> AccessControlUseCase<R>
where
    R: PurchaseRepository + UsageRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn entitlement(&self, user_id: &UserId) -> BillingResult<Entitlement> {
        let purchases = self.repo.list_completed(user_id).await?;
        Ok(Entitlement::resolve(&purchases, Utc::now()))
    }

    pub async fn status(&self, user_id: &UserId, kind: UsageKind) -> BillingResult<QuotaStatus> {
        let entitlement = self.entitlement(user_id).await?;
        self.status_for(&entitlement, user_id, kind).await
    }

    pub async fn status_for(
        &self,
        entitlement: &Entitlement,
        user_id: &UserId,
        kind: UsageKind,
    ) -> BillingResult<QuotaStatus> {
        let now = Utc::now();
        let used = self
            .repo
            .count_since(user_id, kind, entitlement.window_start(kind, now))
            .await?;
        Ok(QuotaStatus::new(entitlement, kind, used, now))
    }
}

impl<R> QuotaGate for AccessControlUseCase<R>
where
    R: PurchaseRepository + UsageRepository + Sync,
{
    async fn check(&self, user_id: &UserId, kind: UsageKind) -> BillingResult<QuotaStatus> {
        let status = self.status(user_id, kind).await?;
        if !status.allowed() {
            tracing::info!(
                user_id = %user_id,
                kind = %kind,
                tier = %status.tier,
                used = status.used,
                "Quota exhausted"
            );
            return Err(BillingError::QuotaExceeded {
                kind,
                tier: status.tier,
            });
        }
        Ok(status)
    }

    async fn consume(
        &self,
        user_id: &UserId,
        kind: UsageKind,
        agent: Option<&str>,
    ) -> BillingResult<QuotaStatus> {
        let status = QuotaGate::check(self, user_id, kind).await?;
        self.repo
            .record(&UsageLog::new(*user_id, kind, agent.map(str::to_string)))
            .await?;
        Ok(status.after_use())
    }
}
