//! Admin audit log browsing and CSV export

use std::sync::Arc;

use kernel::{AuthContext, Paginated, Pagination, UserRole};
use platform::csv::CsvWriter;

use crate::domain::entities::AuditLog;
use crate::domain::filter::{AuditFilter, AuditQuery};
use crate::domain::repository::AuditRepository;
use crate::error::ComplianceResult;

const HEADER: [&str; 8] = [
    "id",
    "created_at",
    "actor_id",
    "action",
    "target_type",
    "target_id",
    "ip",
    "metadata",
];

pub struct AuditLogUseCase<R>
where
    R: AuditRepository,
{
    repo: Arc<R>,
}

impl<R> AuditLogUseCase<R>
where
    R: AuditRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        query: &AuditQuery,
        pagination: Pagination,
    ) -> ComplianceResult<Paginated<AuditLog>> {
        ctx.require_role(UserRole::Admin)?;
        let filter = AuditFilter::parse(query)?;
        let (items, total) = AuditRepository::list(&*self.repo, &filter, pagination).await?;
        Ok(Paginated::new(items, pagination, total))
    }

    /// Returns the CSV document and the number of data rows
    pub async fn export(&self, ctx: &AuthContext, query: &AuditQuery) -> ComplianceResult<(String, usize)> {
        ctx.require_role(UserRole::Admin)?;
        let filter = AuditFilter::parse(query)?;
        let logs = self.repo.export(&filter).await?;

        let mut csv = CsvWriter::with_header(HEADER)?;
        for log in &logs {
            csv.push_row([
                log.id.to_string(),
                log.created_at.to_rfc3339(),
                log.actor_id.map(|id| id.to_string()).unwrap_or_default(),
                log.action.clone(),
                log.target_type.clone(),
                log.target_id.clone().unwrap_or_default(),
                log.ip.clone().unwrap_or_default(),
                log.metadata.to_string(),
            ])?;
        }

        tracing::info!(admin = %ctx.user_id, rows = logs.len(), "Audit log exported");
        Ok((csv.finish()?, logs.len()))
    }
}
