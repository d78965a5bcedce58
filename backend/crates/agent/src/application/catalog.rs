//! Agent Catalog Use Case
//!
//! Lists agents with their enabled state and serves localized prompts.

use std::sync::Arc;

use kernel::Language;
use serde::Serialize;

use crate::domain::catalog::{AgentProfile, LocalizedPrompt, localized, profile};
use crate::domain::repository::ToggleRepository;
use crate::domain::services::ToggleSet;
use crate::domain::value_objects::AgentKind;
use crate::error::{AgentError, AgentResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    #[serde(flatten)]
    pub profile: AgentProfile,
    pub enabled: bool,
    pub is_default: bool,
}

pub fn parse_agent(code: &str) -> AgentResult<AgentKind> {
    AgentKind::from_code(code).ok_or_else(|| AgentError::UnknownAgent(code.to_string()))
}

pub struct AgentCatalogUseCase<R>
where
    R: ToggleRepository,
{
    repo: Arc<R>,
}

impl<R> AgentCatalogUseCase<R>
where
    R: ToggleRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AgentResult<Vec<AgentSummary>> {
        let toggles = ToggleSet::from_toggles(&self.repo.list_toggles().await?);
        Ok(AgentKind::ALL
            .into_iter()
            .map(|agent| AgentSummary {
                profile: profile(agent),
                enabled: toggles.is_enabled(agent),
                is_default: agent == AgentKind::DEFAULT,
            })
            .collect())
    }

    /// Unknown language codes are served as English.
    pub fn prompt(&self, agent: &str, language: Option<&str>) -> AgentResult<LocalizedPrompt> {
        let agent = parse_agent(agent)?;
        Ok(localized(agent, Language::from_code_or_default(language)))
    }
}
