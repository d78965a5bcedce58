//! HTTP Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::audit::AuditHandle;
use kernel::extract::Json;
use kernel::id::UserId;
use kernel::{ApiResponse, AuthContext, UserRole};
use platform::mailer::Mailer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    ManageUserUseCase, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase, TokenService,
};
use crate::domain::repository::{CredentialsRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{AssignRoleRequest, SignInRequest, SignInResponse, SignUpRequest, UserResponse};

/// Shared state for auth handlers
pub struct AuthAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub tokens: Arc<TokenService>,
    pub audit: AuditHandle,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            tokens: self.tokens.clone(),
            audit: self.audit.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ip: platform::client::ClientIp,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + CredentialsRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    let user = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            language: req.language,
            ip: ip.into_string(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(UserResponse::from(&user)),
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ip: platform::client::ClientIp,
    Json(req): Json<SignInRequest>,
) -> AuthResult<ApiResponse<SignInResponse>>
where
    R: UserRepository + CredentialsRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
            ip: ip.into_string(),
        })
        .await?;

    Ok(ApiResponse::ok(SignInResponse {
        token: output.token.token,
        token_type: "Bearer",
        expires_at: output.token.expires_at,
        user: UserResponse::from(&output.user),
    }))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/auth/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ctx: AuthContext,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: UserRepository + CredentialsRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ManageUserUseCase::new(state.repo.clone(), state.audit.clone());
    let user = use_case.current(&ctx).await?;
    Ok(ApiResponse::ok(UserResponse::from(&user)))
}

// ============================================================================
// Admin
// ============================================================================

/// PUT /api/auth/admin/users/{id}/role
pub async fn assign_role<R, M>(
    State(state): State<AuthAppState<R, M>>,
    ctx: AuthContext,
    Path(user_id): Path<String>,
    Json(req): Json<AssignRoleRequest>,
) -> AuthResult<ApiResponse<serde_json::Value>>
where
    R: UserRepository + CredentialsRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let target: UserId = user_id
        .parse()
        .map_err(|_| AuthError::Validation("Invalid user id".into()))?;
    let role = UserRole::from_code(&req.role)
        .ok_or_else(|| AuthError::Validation(format!("Unknown role: {}", req.role)))?;

    let use_case = ManageUserUseCase::new(state.repo.clone(), state.audit.clone());
    use_case.assign_role(&ctx, target, role).await?;

    Ok(ApiResponse::ok(serde_json::json!({
        "userId": target,
        "role": role.code(),
    })))
}
