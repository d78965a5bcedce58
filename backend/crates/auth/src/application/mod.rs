//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod manage_user;
pub mod session;
pub mod sign_in;
pub mod sign_up;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use manage_user::ManageUserUseCase;
pub use session::SessionResolver;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::{IssuedToken, TokenService};
