//! Agents
//!
//! - Three assistant personas (Mira, Kairo, Lumo) with a language matrix
//! - Admin toggles; disabled agents refuse chat
//! - Per-user agent context with bounded metadata
//! - Screened, quota-metered chat against a pluggable assistant backend
//! - Confidence tracking and drift signals

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::AgentConfig;
pub use domain::{AgentKind, AssistantClient};
pub use error::{AgentError, AgentResult};
pub use infra::{AppAssistant, AssistantConfig, CannedAssistantClient, HttpAssistantClient, PgAgentRepository};
pub use presentation::agent_router;
