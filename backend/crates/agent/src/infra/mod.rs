//! Infrastructure Layer

pub mod assistant;
pub mod postgres;

pub use assistant::{AppAssistant, AssistantConfig, CannedAssistantClient, HttpAssistantClient};
pub use postgres::PgAgentRepository;
