//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AgentAppState;
pub use router::agent_router;
