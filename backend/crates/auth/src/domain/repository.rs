//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::UserRole;
use kernel::id::UserId;

use crate::domain::entity::{credentials::Credentials, user::User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert the user and its credentials together
    async fn create(&self, user: &User, credentials: &Credentials) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Persist `last_login_at` and `updated_at`
    async fn record_login(&self, user: &User) -> AuthResult<()>;

    async fn update_role(&self, user_id: &UserId, role: UserRole) -> AuthResult<bool>;
}

/// Credentials repository trait
#[trait_variant::make(CredentialsRepository: Send)]
pub trait LocalCredentialsRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credentials>>;

    async fn update(&self, credentials: &Credentials) -> AuthResult<()>;
}
