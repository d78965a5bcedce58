pub mod catalog;
pub mod chat;
pub mod config;
pub mod context;
pub mod drift;
pub mod toggles;

pub use catalog::{AgentCatalogUseCase, AgentSummary};
pub use chat::{ChatInput, ChatOutcome, ChatUseCase};
pub use config::AgentConfig;
pub use context::{AgentContextUseCase, UpdateContextInput};
pub use drift::{DriftQuery, DriftReportUseCase};
pub use toggles::SetToggleUseCase;
