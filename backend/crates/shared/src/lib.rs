//! Shared Kernel - Domain-crossing minimal core
//!
//! The vocabulary every backend crate agrees on:
//! - Common error type, error kinds and result aliases
//! - Typed ID wrappers
//! - The `{ success, data }` response envelope and pagination
//! - Roles, supported languages and the authenticated caller context
//! - A fire-and-forget audit handle
//! - `Json` / `Query` extractors that reject with the error envelope
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod audit;
pub mod auth_context;
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod language;
pub mod response;
pub mod role;

pub use auth_context::AuthContext;
pub use language::Language;
pub use response::{ApiResponse, Paginated, Pagination};
pub use role::UserRole;
