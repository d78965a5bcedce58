//! HTTP Handlers

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use kernel::audit::AuditHandle;
use kernel::extract::{Json, Query};
use kernel::{ApiResponse, AuthContext, Pagination};
use platform::client::ClientIp;
use platform::csv::{CSV_CONTENT_TYPE, export_filename};
use platform::mailer::Mailer;
use std::sync::Arc;

use crate::application::{
    AuditLogUseCase, ManageDsarUseCase, MyDataUseCase, SubmitDsarInput, SubmitDsarUseCase,
    UpdateDsarInput,
};
use crate::domain::repository::{AuditRepository, DataSubjectStore, DsarRepository};
use crate::error::ComplianceResult;
use crate::presentation::dto::{
    AdminDsarQuery, AdminDsarResponse, AuditListQuery, DsarResponse, DsarUpdateResponse,
    SubmitDsarRequest, UpdateDsarStatusRequest,
};

pub struct ComplianceAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub audit: AuditHandle,
}

impl<R, M> Clone for ComplianceAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            audit: self.audit.clone(),
        }
    }
}

/// POST /api/compliance/dsar
pub async fn submit_dsar<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    ip: ClientIp,
    Json(req): Json<SubmitDsarRequest>,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let request = SubmitDsarUseCase::new(state.repo.clone(), state.mailer.clone(), state.audit.clone())
        .execute(
            &ctx,
            SubmitDsarInput {
                kind: req.kind,
                regulation: req.regulation,
                details: req.details,
                ip: ip.into_string(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(DsarResponse::from(request))))
}

/// GET /api/compliance/dsar
pub async fn my_requests<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let requests = MyDataUseCase::new(state.repo.clone(), state.audit.clone())
        .requests(&ctx)
        .await?;
    Ok(ApiResponse::ok(
        requests.into_iter().map(DsarResponse::from).collect::<Vec<_>>(),
    ))
}

/// GET /api/compliance/dsar/export
pub async fn export_my_data<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    ip: ClientIp,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let bundle = MyDataUseCase::new(state.repo.clone(), state.audit.clone())
        .export(&ctx, ip.into_string())
        .await?;

    let disposition = format!(
        "attachment; filename=\"my-data-{}.json\"",
        Utc::now().format("%Y%m%d")
    );
    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        ApiResponse::ok(bundle),
    ))
}

/// GET /api/compliance/admin/dsar
pub async fn list_requests<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    Query(query): Query<AdminDsarQuery>,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let page = ManageDsarUseCase::new(state.repo.clone(), state.mailer.clone(), state.audit.clone())
        .list(&ctx, &query.filter(), Pagination::new(query.page, query.limit))
        .await?;
    Ok(ApiResponse::ok(page.map(AdminDsarResponse::from)))
}

/// POST /api/compliance/admin/dsar/{id}/status
pub async fn update_request_status<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    ip: ClientIp,
    Path(id): Path<String>,
    Json(req): Json<UpdateDsarStatusRequest>,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let update = ManageDsarUseCase::new(state.repo.clone(), state.mailer.clone(), state.audit.clone())
        .update_status(
            &ctx,
            &id,
            UpdateDsarInput {
                status: req.status,
                note: req.note,
                ip: ip.into_string(),
            },
        )
        .await?;
    Ok(ApiResponse::ok(DsarUpdateResponse::from(update)))
}

/// GET /api/compliance/admin/audit
pub async fn list_audit<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    Query(query): Query<AuditListQuery>,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let page = AuditLogUseCase::new(state.repo.clone())
        .list(&ctx, &query.filter(), Pagination::new(query.page, query.limit))
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/compliance/admin/audit/export
pub async fn export_audit<R, M>(
    State(state): State<ComplianceAppState<R, M>>,
    ctx: AuthContext,
    Query(query): Query<AuditListQuery>,
) -> ComplianceResult<impl IntoResponse>
where
    R: DsarRepository + AuditRepository + DataSubjectStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let (csv, _) = AuditLogUseCase::new(state.repo.clone())
        .export(&ctx, &query.filter())
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename("audit-log", Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
