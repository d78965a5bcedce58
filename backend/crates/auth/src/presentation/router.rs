//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};
use kernel::audit::AuditHandle;
use platform::mailer::{AppMailer, Mailer};
use std::sync::Arc;

use crate::application::{AuthConfig, TokenService};
use crate::domain::repository::{CredentialsRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: PgAuthRepository,
    mailer: Arc<AppMailer>,
    tokens: Arc<TokenService>,
    audit: AuditHandle,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, mailer, tokens, audit, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, M>(
    repo: R,
    mailer: Arc<M>,
    tokens: Arc<TokenService>,
    audit: AuditHandle,
    config: AuthConfig,
) -> Router
where
    R: UserRepository + CredentialsRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer,
        tokens,
        audit,
        config: Arc::new(config),
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, M>))
        .route("/signin", post(handlers::sign_in::<R, M>))
        .route("/me", get(handlers::me::<R, M>))
        .route("/admin/users/{id}/role", put(handlers::assign_role::<R, M>))
        .with_state(state)
}
