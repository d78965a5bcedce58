//! Session Resolution
//!
//! A bearer token proves who signed in; the user row decides what they may
//! do now. Role changes, disabling and erasure apply to tokens already issued.

use std::sync::Arc;

use kernel::AuthContext;

use crate::application::token::TokenService;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_status::UserStatus;
use crate::error::{AuthError, AuthResult};

pub struct SessionResolver<U>
where
    U: UserRepository,
{
    tokens: Arc<TokenService>,
    user_repo: Arc<U>,
}

impl<U> SessionResolver<U>
where
    U: UserRepository,
{
    pub fn new(tokens: Arc<TokenService>, user_repo: Arc<U>) -> Self {
        Self { tokens, user_repo }
    }

    pub async fn resolve(&self, token: &str) -> AuthResult<AuthContext> {
        let claimed = self.tokens.verify(token)?;

        let user = self
            .user_repo
            .find_by_id(&claimed.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        match user.status {
            UserStatus::Disabled => return Err(AuthError::AccountDisabled),
            UserStatus::Erased => return Err(AuthError::InvalidToken),
            UserStatus::Active | UserStatus::PendingDeletion => {}
        }

        if user.role != claimed.role {
            tracing::debug!(
                user_id = %user.user_id,
                token_role = %claimed.role,
                role = %user.role,
                "Token role is stale"
            );
        }

        Ok(AuthContext::new(user.user_id, user.role, claimed.language))
    }
}
