//! Sign In Use Case
//!
//! Verifies email + password and issues a bearer token. Five consecutive
//! failures lock the account for 15 minutes.

use std::sync::Arc;

use chrono::Utc;
use kernel::audit::{AuditEvent, AuditHandle};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::token::{IssuedToken, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::{CredentialsRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub ip: Option<String>,
}

pub struct SignInOutput {
    pub user: User,
    pub token: IssuedToken,
}

impl std::fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInOutput")
            .field("user", &self.user)
            .field("token_expires_at", &self.token.expires_at)
            .finish_non_exhaustive()
    }
}

pub struct SignInUseCase<U, C>
where
    U: UserRepository,
    C: CredentialsRepository,
{
    user_repo: Arc<U>,
    credentials_repo: Arc<C>,
    tokens: Arc<TokenService>,
    audit: AuditHandle,
    config: Arc<AuthConfig>,
}

impl<U, C> SignInUseCase<U, C>
where
    U: UserRepository,
    C: CredentialsRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        credentials_repo: Arc<C>,
        tokens: Arc<TokenService>,
        audit: AuditHandle,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credentials_repo,
            tokens,
            audit,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::parse(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let mut credentials = self
            .credentials_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".into()))?;

        let now = Utc::now();
        if credentials.is_locked_at(now) {
            return Err(AuthError::AccountLocked);
        }

        let password = ClearTextPassword::for_verification(input.password);
        if !credentials
            .password_hash
            .verify(&password, self.config.pepper())
        {
            credentials.record_failure_at(now);
            self.credentials_repo.update(&credentials).await?;

            self.audit.record(
                AuditEvent::new("user.sign_in_failed", "user")
                    .target(user.user_id)
                    .metadata(serde_json::json!({
                        "failed_attempts": credentials.failed_attempts,
                        "locked": credentials.is_locked_at(now),
                    }))
                    .ip(input.ip),
            );

            return Err(if credentials.is_locked_at(now) {
                AuthError::AccountLocked
            } else {
                AuthError::InvalidCredentials
            });
        }

        if credentials.failed_attempts > 0 || credentials.locked_until.is_some() {
            credentials.reset_failures();
            self.credentials_repo.update(&credentials).await?;
        }

        user.record_login();
        self.user_repo.record_login(&user).await?;

        let token = self.tokens.issue(&user.auth_context())?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User signed in");

        self.audit.record(
            AuditEvent::new("user.signed_in", "user")
                .actor(user.user_id)
                .target(user.user_id)
                .ip(input.ip),
        );

        Ok(SignInOutput { user, token })
    }
}
