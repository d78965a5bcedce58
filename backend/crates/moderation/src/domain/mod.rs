//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entities;
pub mod filter;
pub mod ports;
pub mod repository;
pub mod rules;
pub mod services;
pub mod value_objects;

// Re-exports
pub use entities::ModerationFlag;
pub use filter::{FlagFilter, FlagQuery};
pub use ports::{ContentScreener, ContentStatusUpdater, ContentSubmission, ScreeningOutcome};
pub use repository::FlagRepository;
pub use services::{AlertThrottle, ContentFilter, ScreeningResult};
pub use value_objects::*;
