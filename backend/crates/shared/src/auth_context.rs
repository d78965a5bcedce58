//! Authenticated caller context
//!
//! The auth middleware verifies the bearer token and stores an
//! [`AuthContext`] in the request extensions. Handlers in every crate take it
//! as an extractor: `AuthContext` when sign-in is required,
//! `Option<AuthContext>` when it is optional.

use crate::error::app_error::{AppError, AppResult};
use crate::id::UserId;
use crate::language::Language;
use crate::role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: UserRole,
    pub language: Language,
}

impl AuthContext {
    pub fn new(user_id: UserId, role: UserRole, language: Language) -> Self {
        Self {
            user_id,
            role,
            language,
        }
    }

    /// 403 unless the caller's role is at least `min`.
    pub fn require_role(&self, min: UserRole) -> AppResult<()> {
        if self.role >= min {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role,
                required = %min,
                "Insufficient role"
            );
            Err(AppError::forbidden(format!("Requires {} role", min.code())))
        }
    }

    /// The caller owns the resource or is an admin.
    pub fn can_access(&self, owner: &UserId) -> bool {
        self.user_id == *owner || self.role.is_admin_or_higher()
    }
}

#[cfg(feature = "axum")]
mod extract {
    use super::AuthContext;
    use crate::error::app_error::AppError;
    use axum::extract::{FromRequestParts, OptionalFromRequestParts};
    use http::request::Parts;
    use std::convert::Infallible;

    impl<S> FromRequestParts<S> for AuthContext
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            parts
                .extensions
                .get::<AuthContext>()
                .cloned()
                .ok_or_else(|| {
                    AppError::unauthorized("Authentication required")
                        .with_action("Sign in and try again")
                })
        }
    }

    impl<S> OptionalFromRequestParts<S> for AuthContext
    where
        S: Send + Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Option<Self>, Self::Rejection> {
            Ok(parts.extensions.get::<AuthContext>().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext::new(UserId::new(), role, Language::En)
    }

    #[test]
    fn test_require_role() {
        assert!(ctx(UserRole::Moderator).require_role(UserRole::Moderator).is_ok());
        assert!(ctx(UserRole::Admin).require_role(UserRole::Moderator).is_ok());

        let err = ctx(UserRole::User)
            .require_role(UserRole::Moderator)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_can_access() {
        let user = ctx(UserRole::User);
        assert!(user.can_access(&user.user_id));
        assert!(!user.can_access(&UserId::new()));
        assert!(ctx(UserRole::Admin).can_access(&UserId::new()));
    }
}
