//! Profile lookup and role assignment

use std::sync::Arc;

use kernel::audit::{AuditEvent, AuditHandle};
use kernel::id::UserId;
use kernel::{AuthContext, UserRole};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct ManageUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    audit: AuditHandle,
}

impl<U> ManageUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, audit: AuditHandle) -> Self {
        Self { user_repo, audit }
    }

    /// The signed-in user's own profile
    pub async fn current(&self, ctx: &AuthContext) -> AuthResult<User> {
        let user = self
            .user_repo
            .find_by_id(&ctx.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.status.is_terminal() {
            return Err(AuthError::AccountDisabled);
        }
        Ok(user)
    }

    /// Super admins only. A caller cannot change their own role.
    pub async fn assign_role(
        &self,
        ctx: &AuthContext,
        target: UserId,
        role: UserRole,
    ) -> AuthResult<()> {
        ctx.require_role(UserRole::SuperAdmin)
            .map_err(|_| AuthError::Forbidden)?;
        if ctx.user_id == target {
            return Err(AuthError::Validation("You cannot change your own role".into()));
        }

        if !self.user_repo.update_role(&target, role).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(actor = %ctx.user_id, target = %target, role = %role, "Role assigned");
        self.audit.record(
            AuditEvent::new("user.role_assigned", "user")
                .actor(ctx.user_id)
                .target(target)
                .metadata(serde_json::json!({ "role": role.code() })),
        );
        Ok(())
    }
}
