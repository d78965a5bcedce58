//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + password sign-up / sign-in
//! - HS256 bearer tokens checked against the account's current status and role
//! - Role-based access (User, Moderator, Admin, SuperAdmin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Temporary lockout after repeated failed sign-ins
//! - Unknown email and wrong password produce the same error

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::session::SessionResolver;
pub use application::token::TokenService;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::attach_auth_context;
pub use presentation::router::auth_router;
