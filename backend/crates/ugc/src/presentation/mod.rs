//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::UgcAppState;
pub use router::{stories_router, ugc_router};
