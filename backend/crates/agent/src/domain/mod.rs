pub mod catalog;
pub mod entities;
pub mod ports;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use catalog::{AgentProfile, LocalizedPrompt, localized, profile};
pub use entities::{AgentContext, AgentToggle, ConfidenceScore, DriftSignal};
pub use ports::{AssistantClient, AssistantReply, AssistantRequest};
pub use repository::{ContextRepository, DriftFilter, SignalRepository, ToggleRepository};
pub use services::ToggleSet;
pub use value_objects::{AgentKind, Confidence, DriftKind};
