//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ComplianceAppState;
pub use router::compliance_router;
