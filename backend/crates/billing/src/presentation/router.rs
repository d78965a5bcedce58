//! Billing Router

use axum::{
    Router,
    routing::{get, post},
};
use kernel::audit::AuditHandle;
use platform::mailer::Mailer;
use platform::webhook::WebhookVerifier;
use std::sync::Arc;

use crate::application::config::BillingConfig;
use crate::domain::repository::{AccountDirectory, PurchaseRepository, UsageRepository};
use crate::presentation::handlers::{self, BillingAppState};

/// Mounted at `/api/billing`
pub fn billing_router<R, M>(
    repo: Arc<R>,
    mailer: Arc<M>,
    verifier: Arc<WebhookVerifier>,
    audit: AuditHandle,
    config: BillingConfig,
) -> Router
where
    R: PurchaseRepository + UsageRepository + AccountDirectory + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = BillingAppState {
        repo,
        mailer,
        verifier,
        audit,
        config: Arc::new(config),
    };

    Router::new()
        .route("/plans", get(handlers::list_plans))
        .route("/entitlement", get(handlers::entitlement::<R, M>))
        .route("/purchases", get(handlers::my_purchases::<R, M>))
        .route("/checkout", post(handlers::checkout::<R, M>))
        .route("/usage/forms", post(handlers::consume_form::<R, M>))
        .route("/webhook", post(handlers::webhook::<R, M>))
        .route(
            "/admin/purchases/export",
            get(handlers::export_purchases::<R, M>),
        )
        .with_state(state)
}
