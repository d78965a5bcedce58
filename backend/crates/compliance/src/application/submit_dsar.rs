//! Submit DSAR Use Case
//!
//! Opens a data subject request. One open request per user and kind.

use std::sync::Arc;

use chrono::Utc;
use kernel::AuthContext;
use kernel::audit::{AuditEvent, AuditHandle};
use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use serde_json::json;

use crate::domain::entities::{DsarRequest, MAX_DETAILS_CHARS};
use crate::domain::repository::{DataSubjectStore, DsarRepository};
use crate::domain::value_objects::{DsarKind, Regulation};
use crate::error::{ComplianceError, ComplianceResult};

pub struct SubmitDsarInput {
    pub kind: String,
    /// `gdpr` when omitted
    pub regulation: Option<String>,
    pub details: Option<String>,
    pub ip: Option<String>,
}

pub struct SubmitDsarUseCase<R, M>
where
    R: DsarRepository + DataSubjectStore,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    audit: AuditHandle,
}

impl<R, M> SubmitDsarUseCase<R, M>
where
    R: DsarRepository + DataSubjectStore + Sync,
    M: Mailer + Sync,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, audit: AuditHandle) -> Self {
        Self { repo, mailer, audit }
    }

    pub async fn execute(&self, ctx: &AuthContext, input: SubmitDsarInput) -> ComplianceResult<DsarRequest> {
        let kind = DsarKind::from_code(&input.kind)
            .ok_or_else(|| ComplianceError::Validation(format!("Unknown request kind: {}", input.kind)))?;
        let regulation = match input.regulation.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Regulation::from_code(code)
                .ok_or_else(|| ComplianceError::Validation(format!("Unknown regulation: {}", code)))?,
            None => Regulation::Gdpr,
        };
        let details = input
            .details
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if details.as_ref().is_some_and(|d| d.chars().count() > MAX_DETAILS_CHARS) {
            return Err(ComplianceError::Validation(format!(
                "Details are limited to {} characters",
                MAX_DETAILS_CHARS
            )));
        }

        if self.repo.find_open(&ctx.user_id, kind).await?.is_some() {
            return Err(ComplianceError::OpenRequestExists(kind));
        }

        let request = DsarRequest::new(ctx.user_id, kind, regulation, details, Utc::now());
        DsarRepository::create(&*self.repo, &request).await?;

        tracing::info!(
            request_id = %request.request_id,
            user_id = %ctx.user_id,
            kind = %kind,
            regulation = %regulation,
            due_at = %request.due_at,
            "Data subject request received"
        );
        self.audit.record(
            AuditEvent::new("dsar.received", "dsar_request")
                .actor(ctx.user_id)
                .target(request.request_id)
                .metadata(json!({ "kind": kind.code(), "regulation": regulation.code() }))
                .ip(input.ip),
        );

        self.notify(&request).await;
        Ok(request)
    }

    async fn notify(&self, request: &DsarRequest) {
        let contact = match self.repo.contact(&request.user_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not look up requester");
                return;
            }
        };

        let message = EmailMessage::new(contact.email, EmailTemplate::DsarReceived, contact.language.code())
            .with_data(json!({
                "request_id": request.request_id.to_string(),
                "kind": request.kind.code(),
                "regulation": request.regulation.code(),
                "due_at": request.due_at.to_rfc3339(),
            }));
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(error = %e, request_id = %request.request_id, "DSAR receipt email failed");
        }
    }
}
