//! User-Generated Stories
//!
//! - Story submission, screened through `moderation` before it is stored
//! - Public listing by language, category, country and free-text search
//! - Category administration and admin CSV export
//! - Media upload with content sniffing, stored on local disk
//!
//! Moderator decisions reach stories through the
//! [`moderation::ContentStatusUpdater`] implementation on [`PgUgcRepository`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::UgcConfig;
pub use error::{UgcError, UgcResult};
pub use infra::{DiskMediaStorage, PgUgcRepository};
pub use presentation::{stories_router, ugc_router};
