//! Admin DSAR handling
//!
//! Completing an erasure request erases the subject's personal data before
//! the status is written. The completion email goes to the address held
//! before erasure.

use std::sync::Arc;

use chrono::Utc;
use kernel::audit::{AuditEvent, AuditHandle};
use kernel::id::DsarRequestId;
use kernel::{AuthContext, Paginated, Pagination, UserRole};
use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use serde_json::json;

use crate::domain::entities::{DsarRequest, ErasureReport};
use crate::domain::filter::{DsarFilter, DsarListQuery};
use crate::domain::repository::{DataSubjectStore, DsarRepository, SubjectContact};
use crate::domain::value_objects::{DsarKind, DsarStatus};
use crate::error::{ComplianceError, ComplianceResult};

pub struct UpdateDsarInput {
    pub status: String,
    pub note: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DsarUpdate {
    pub request: DsarRequest,
    pub erasure: Option<ErasureReport>,
}

pub struct ManageDsarUseCase<R, M>
where
    R: DsarRepository + DataSubjectStore,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    audit: AuditHandle,
}

impl<R, M> ManageDsarUseCase<R, M>
where
    R: DsarRepository + DataSubjectStore + Sync,
    M: Mailer + Sync,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, audit: AuditHandle) -> Self {
        Self { repo, mailer, audit }
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        query: &DsarListQuery,
        pagination: Pagination,
    ) -> ComplianceResult<Paginated<DsarRequest>> {
        ctx.require_role(UserRole::Admin)?;
        let filter = DsarFilter::parse(query, Utc::now())?;
        let (items, total) = DsarRepository::list(&*self.repo, &filter, pagination).await?;
        Ok(Paginated::new(items, pagination, total))
    }

    pub async fn update_status(
        &self,
        ctx: &AuthContext,
        request_id: &str,
        input: UpdateDsarInput,
    ) -> ComplianceResult<DsarUpdate> {
        ctx.require_role(UserRole::Admin)?;
        let id: DsarRequestId = request_id
            .parse()
            .map_err(|_| ComplianceError::RequestNotFound)?;
        let next = DsarStatus::from_code(&input.status)
            .ok_or_else(|| ComplianceError::Validation(format!("Unknown status: {}", input.status)))?;

        let mut request = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or(ComplianceError::RequestNotFound)?;
        let previous = request.status;
        let note = input.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        request.transition(next, ctx.user_id, note, Utc::now())?;

        let contact = self.contact(&request).await;
        let erasure = if request.kind == DsarKind::Erasure && next == DsarStatus::Completed {
            let report = self.repo.erase(&request.user_id).await?;
            tracing::info!(
                user_id = %request.user_id,
                stories = report.stories_anonymised,
                usage_logs = report.usage_logs_deleted,
                "Personal data erased"
            );
            Some(report)
        } else {
            None
        };

        if !self.repo.transition(&request, previous).await? {
            let current = self
                .repo
                .find_by_id(&id)
                .await?
                .map(|r| r.status)
                .unwrap_or(previous);
            return Err(ComplianceError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        tracing::info!(
            request_id = %request.request_id,
            admin_id = %ctx.user_id,
            from = %previous,
            to = %next,
            "Data subject request updated"
        );
        self.audit.record(
            AuditEvent::new(format!("dsar.{}", next.code()), "dsar_request")
                .actor(ctx.user_id)
                .target(request.request_id)
                .metadata(json!({
                    "kind": request.kind.code(),
                    "from": previous.code(),
                    "erasure": erasure,
                }))
                .ip(input.ip),
        );

        if !next.is_open() {
            if let Some(contact) = contact {
                self.notify(contact, &request).await;
            }
        }

        Ok(DsarUpdate { request, erasure })
    }

    async fn contact(&self, request: &DsarRequest) -> Option<SubjectContact> {
        match self.repo.contact(&request.user_id).await {
            Ok(contact) => contact,
            Err(e) => {
                tracing::warn!(error = %e, "Could not look up requester");
                None
            }
        }
    }

    async fn notify(&self, contact: SubjectContact, request: &DsarRequest) {
        let message = EmailMessage::new(contact.email, EmailTemplate::DsarCompleted, contact.language.code())
            .with_data(json!({
                "request_id": request.request_id.to_string(),
                "kind": request.kind.code(),
                "status": request.status.code(),
                "note": request.resolution_note,
            }));
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(error = %e, request_id = %request.request_id, "DSAR completion email failed");
        }
    }
}
