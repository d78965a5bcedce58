//! Compliance Router

use axum::{
    Router,
    routing::{get, post},
};
use kernel::audit::AuditHandle;
use platform::mailer::Mailer;
use std::sync::Arc;

use crate::domain::repository::{AuditRepository, DataSubjectStore, DsarRepository};
use crate::presentation::handlers::{self, ComplianceAppState};

/// Mounted at `/api/compliance`
pub fn compliance_router<R, M>(repo: Arc<R>, mailer: Arc<M>, audit: AuditHandle) -> Router
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = ComplianceAppState { repo, mailer, audit };

    Router::new()
        .route(
            "/dsar",
            post(handlers::submit_dsar::<R, M>).get(handlers::my_requests::<R, M>),
        )
        .route("/dsar/export", get(handlers::export_my_data::<R, M>))
        .route("/admin/dsar", get(handlers::list_requests::<R, M>))
        .route(
            "/admin/dsar/{id}/status",
            post(handlers::update_request_status::<R, M>),
        )
        .route("/admin/audit", get(handlers::list_audit::<R, M>))
        .route("/admin/audit/export", get(handlers::export_audit::<R, M>))
        .with_state(state)
}
