//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{credentials::Credentials, user::User};
pub use repository::{CredentialsRepository, UserRepository};
