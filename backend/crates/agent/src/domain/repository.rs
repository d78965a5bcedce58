//! Repository Traits

use kernel::id::UserId;
use kernel::{Language, Pagination};

use crate::domain::entities::{AgentContext, AgentToggle, ConfidenceScore, DriftSignal};
use crate::domain::value_objects::{AgentKind, Confidence, DriftKind};
use crate::error::AgentResult;

#[trait_variant::make(ToggleRepository: Send)]
pub trait LocalToggleRepository {
    async fn list_toggles(&self) -> AgentResult<Vec<AgentToggle>>;

    async fn save_toggle(&self, toggle: &AgentToggle) -> AgentResult<()>;
}

#[trait_variant::make(ContextRepository: Send)]
pub trait LocalContextRepository {
    async fn find_context(&self, user_id: &UserId) -> AgentResult<Option<AgentContext>>;

    async fn save_context(&self, context: &AgentContext) -> AgentResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct DriftFilter {
    pub agent: Option<AgentKind>,
    pub language: Option<Language>,
    pub kind: Option<DriftKind>,
}

#[trait_variant::make(SignalRepository: Send)]
pub trait LocalSignalRepository {
    async fn record_score(&self, score: &ConfidenceScore) -> AgentResult<()>;

    /// Newest first
    async fn recent_scores(
        &self,
        agent: AgentKind,
        language: Language,
        limit: usize,
    ) -> AgentResult<Vec<Confidence>>;

    async fn record_drift(&self, signal: &DriftSignal) -> AgentResult<()>;

    /// Newest first
    async fn list_drift(
        &self,
        filter: &DriftFilter,
        pagination: Pagination,
    ) -> AgentResult<(Vec<DriftSignal>, i64)>;
}
