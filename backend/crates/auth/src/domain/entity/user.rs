//! User Entity
//!
//! Profile data. Credentials live in [`Credentials`](super::credentials::Credentials).

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::{AuthContext, Language, UserRole};

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub display_name: DisplayName,
    pub role: UserRole,
    pub status: UserStatus,
    pub preferred_language: Language,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: Email, display_name: DisplayName, preferred_language: Language) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            display_name,
            role: UserRole::default(),
            status: UserStatus::default(),
            preferred_language,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// What the auth middleware will see for this user's tokens.
    pub fn auth_context(&self) -> AuthContext {
        AuthContext::new(self.user_id, self.role, self.preferred_language)
    }
}
