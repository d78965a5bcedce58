//! Sign Up Use Case
//!
//! Creates a new user account and sends the welcome email.

use std::sync::Arc;

use kernel::Language;
use kernel::audit::{AuditEvent, AuditHandle};
use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use platform::password::ClearTextPassword;
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::domain::entity::{credentials::Credentials, user::User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub language: Option<String>,
    pub ip: Option<String>,
}

pub struct SignUpUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    audit: AuditHandle,
    config: Arc<AuthConfig>,
}

impl<U, M> SignUpUseCase<U, M>
where
    U: UserRepository,
    M: Mailer + Sync,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, audit: AuditHandle, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            audit,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let email = Email::parse(&input.email)?;
        let display_name = DisplayName::parse(&input.display_name)?;
        let language = Language::from_code_or_default(input.language.as_deref());

        let password = ClearTextPassword::new(input.password)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password.hash(self.config.pepper())?;
        let user = User::new(email, display_name, language);
        let credentials = Credentials::new(user.user_id, password_hash);

        self.user_repo.create(&user, &credentials).await?;

        tracing::info!(
            user_id = %user.user_id,
            lang = %user.preferred_language,
            "User signed up"
        );

        self.audit.record(
            AuditEvent::new("user.signed_up", "user")
                .actor(user.user_id)
                .target(user.user_id)
                .ip(input.ip),
        );

        let welcome = EmailMessage::new(
            user.email.as_str(),
            EmailTemplate::Welcome,
            user.preferred_language.code(),
        )
        .with_data(json!({ "display_name": user.display_name.as_str() }));
        if let Err(e) = self.mailer.send(&welcome).await {
            tracing::warn!(error = %e, user_id = %user.user_id, "Welcome email failed");
        }

        Ok(user)
    }
}
