//! HTTP Handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use kernel::audit::AuditHandle;
use kernel::extract::{Json, Query};
use kernel::{ApiResponse, AuthContext, Pagination};
use platform::client::ClientIp;
use platform::csv::{CSV_CONTENT_TYPE, export_filename};
use platform::mailer::Mailer;
use platform::webhook::WebhookVerifier;
use std::sync::Arc;

use crate::application::config::BillingConfig;
use crate::application::{
    AccessControlUseCase, CheckoutInput, CheckoutUseCase, HandleWebhookUseCase, PurchasesUseCase,
};
use crate::domain::filter::PurchaseExportQuery;
use crate::domain::ports::QuotaGate;
use crate::domain::pricing::PRICING;
use crate::domain::repository::{AccountDirectory, PurchaseRepository, UsageRepository};
use crate::domain::value_objects::UsageKind;
use crate::error::BillingResult;
use crate::presentation::dto::{
    CheckoutRequest, EntitlementResponse, PageQuery, PurchaseResponse, WebhookAck,
};

pub struct BillingAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub verifier: Arc<WebhookVerifier>,
    pub audit: AuditHandle,
    pub config: Arc<BillingConfig>,
}

impl<R, M> Clone for BillingAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            verifier: self.verifier.clone(),
            audit: self.audit.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /api/billing/plans
pub async fn list_plans() -> impl IntoResponse {
    ApiResponse::ok(&PRICING)
}

/// GET /api/billing/entitlement
pub async fn entitlement<R, M>(
    State(state): State<BillingAppState<R, M>>,
    ctx: AuthContext,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let access = AccessControlUseCase::new(state.repo.clone());
    let entitlement = access.entitlement(&ctx.user_id).await?;
    let forms = access
        .status_for(&entitlement, &ctx.user_id, UsageKind::FormGeneration)
        .await?;
    let prompts = access
        .status_for(&entitlement, &ctx.user_id, UsageKind::AiPrompt)
        .await?;

    Ok(ApiResponse::ok(EntitlementResponse::new(entitlement, forms, prompts)))
}

/// GET /api/billing/purchases
pub async fn my_purchases<R, M>(
    State(state): State<BillingAppState<R, M>>,
    ctx: AuthContext,
    Query(query): Query<PageQuery>,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let page = PurchasesUseCase::new(state.repo.clone())
        .mine(&ctx, Pagination::new(query.page, query.limit))
        .await?;
    Ok(ApiResponse::ok(page.map(PurchaseResponse::from)))
}

/// POST /api/billing/checkout
pub async fn checkout<R, M>(
    State(state): State<BillingAppState<R, M>>,
    ctx: AuthContext,
    ip: ClientIp,
    Json(req): Json<CheckoutRequest>,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let purchase = CheckoutUseCase::new(state.repo.clone(), state.audit.clone())
        .execute(
            &ctx,
            CheckoutInput {
                tier: req.tier,
                provider: req.provider,
                ip: ip.into_string(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(PurchaseResponse::from(purchase))))
}

/// POST /api/billing/usage/forms
pub async fn consume_form<R, M>(
    State(state): State<BillingAppState<R, M>>,
    ctx: AuthContext,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let status = AccessControlUseCase::new(state.repo.clone())
        .consume(&ctx.user_id, UsageKind::FormGeneration, None)
        .await?;
    Ok(ApiResponse::ok(status))
}

/// POST /api/billing/webhook
///
/// Unauthenticated; trust comes from the signature over the raw body.
pub async fn webhook<R, M>(
    State(state): State<BillingAppState<R, M>>,
    headers: HeaderMap,
    body: Bytes,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let signature = headers
        .get(state.config.signature_header.as_str())
        .and_then(|v| v.to_str().ok());

    let use_case = HandleWebhookUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.verifier.clone(),
        state.audit.clone(),
    );
    let outcome = use_case.execute(signature, &body).await?;

    Ok(ApiResponse::ok(WebhookAck { outcome }))
}

/// GET /api/billing/admin/purchases/export
pub async fn export_purchases<R, M>(
    State(state): State<BillingAppState<R, M>>,
    ctx: AuthContext,
    Query(query): Query<PurchaseExportQuery>,
) -> BillingResult<impl IntoResponse>
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let (csv, _) = PurchasesUseCase::new(state.repo.clone())
        .export(&ctx, &query)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename("purchases", Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
