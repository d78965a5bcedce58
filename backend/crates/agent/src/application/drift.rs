//! Drift Report Use Case

use std::sync::Arc;

use kernel::{AuthContext, Language, Paginated, Pagination, UserRole};

use crate::application::catalog::parse_agent;
use crate::domain::entities::DriftSignal;
use crate::domain::repository::{DriftFilter, SignalRepository};
use crate::domain::value_objects::DriftKind;
use crate::error::{AgentError, AgentResult};

#[derive(Debug, Clone, Default)]
pub struct DriftQuery {
    pub agent: Option<String>,
    pub language: Option<String>,
    pub kind: Option<String>,
}

impl DriftQuery {
    pub fn into_filter(self) -> AgentResult<DriftFilter> {
        let agent = self.agent.as_deref().map(parse_agent).transpose()?;
        let language = self
            .language
            .as_deref()
            .map(|code| {
                Language::from_code(code)
                    .ok_or_else(|| AgentError::Validation(format!("Unsupported language: {}", code)))
            })
            .transpose()?;
        let kind = self
            .kind
            .as_deref()
            .map(|code| {
                DriftKind::from_code(code)
                    .ok_or_else(|| AgentError::Validation(format!("Unknown drift kind: {}", code)))
            })
            .transpose()?;
        Ok(DriftFilter {
            agent,
            language,
            kind,
        })
    }
}

pub struct DriftReportUseCase<R>
where
    R: SignalRepository,
{
    repo: Arc<R>,
}

impl<R> DriftReportUseCase<R>
where
    R: SignalRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        ctx: &AuthContext,
        query: DriftQuery,
        pagination: Pagination,
    ) -> AgentResult<Paginated<DriftSignal>> {
        ctx.require_role(UserRole::Admin)?;
        let filter = query.into_filter()?;
        let (signals, total) = self.repo.list_drift(&filter, pagination).await?;
        Ok(Paginated::new(signals, pagination, total))
    }
}
