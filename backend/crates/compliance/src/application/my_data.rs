//! The caller's own requests and personal data export

use std::sync::Arc;

use kernel::AuthContext;
use kernel::audit::{AuditEvent, AuditHandle};

use crate::domain::entities::{AccessBundle, DsarRequest};
use crate::domain::repository::{DataSubjectStore, DsarRepository};
use crate::error::ComplianceResult;

pub struct MyDataUseCase<R>
where
    R: DsarRepository + DataSubjectStore,
{
    repo: Arc<R>,
    audit: AuditHandle,
}

impl<R> MyDataUseCase<R>
where
    R: DsarRepository + DataSubjectStore + Sync,
{
    pub fn new(repo: Arc<R>, audit: AuditHandle) -> Self {
        Self { repo, audit }
    }

    pub async fn requests(&self, ctx: &AuthContext) -> ComplianceResult<Vec<DsarRequest>> {
        self.repo.list_by_user(&ctx.user_id).await
    }

    pub async fn export(&self, ctx: &AuthContext, ip: Option<String>) -> ComplianceResult<AccessBundle> {
        let bundle = self.repo.access_bundle(&ctx.user_id).await?;

        tracing::info!(
            user_id = %ctx.user_id,
            stories = bundle.stories.len(),
            purchases = bundle.purchases.len(),
            "Personal data exported"
        );
        self.audit.record(
            AuditEvent::new("dsar.data_exported", "user")
                .actor(ctx.user_id)
                .target(ctx.user_id)
                .ip(ip),
        );
        Ok(bundle)
    }
}
