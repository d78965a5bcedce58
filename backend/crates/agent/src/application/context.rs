//! Agent Context Use Case
//!
//! Resolves, switches and annotates the caller's conversation state.

use std::sync::Arc;

use chrono::Utc;
use kernel::{AuthContext, Language};
use serde_json::Value;

use crate::application::catalog::parse_agent;
use crate::domain::entities::AgentContext;
use crate::domain::repository::{ContextRepository, ToggleRepository};
use crate::domain::services::{ToggleSet, merge_metadata};
use crate::error::{AgentError, AgentResult};

#[derive(Debug, Clone, Default)]
pub struct UpdateContextInput {
    pub agent: Option<String>,
    pub language: Option<String>,
}

pub struct AgentContextUseCase<R>
where
    R: ContextRepository + ToggleRepository,
{
    repo: Arc<R>,
}

impl<R> AgentContextUseCase<R>
where
    R: ContextRepository + ToggleRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Stored context, or the default one. A disabled active agent is
    /// swapped for the first enabled agent; the swap is not persisted.
    pub async fn resolve(&self, ctx: &AuthContext) -> AgentResult<AgentContext> {
        let mut context = self
            .repo
            .find_context(&ctx.user_id)
            .await?
            .unwrap_or_else(|| AgentContext::default_for(ctx.user_id, ctx.language));

        let toggles = ToggleSet::from_toggles(&self.repo.list_toggles().await?);
        if let Some(agent) = toggles.first_enabled(context.active_agent) {
            context.active_agent = agent;
        }
        Ok(context)
    }

    pub async fn update(&self, ctx: &AuthContext, input: UpdateContextInput) -> AgentResult<AgentContext> {
        let mut context = self
            .repo
            .find_context(&ctx.user_id)
            .await?
            .unwrap_or_else(|| AgentContext::default_for(ctx.user_id, ctx.language));

        if let Some(code) = input.agent.as_deref() {
            let agent = parse_agent(code)?;
            let toggles = ToggleSet::from_toggles(&self.repo.list_toggles().await?);
            if !toggles.is_enabled(agent) {
                return Err(AgentError::AgentUnavailable(agent));
            }
            context.active_agent = agent;
        }
        if let Some(code) = input.language.as_deref() {
            context.language = Language::from_code(code)
                .ok_or_else(|| AgentError::Validation(format!("Unsupported language: {}", code)))?;
        }
        context.updated_at = Utc::now();

        self.repo.save_context(&context).await?;
        tracing::debug!(
            user_id = %ctx.user_id,
            agent = %context.active_agent,
            language = %context.language,
            "Agent context updated"
        );
        Ok(context)
    }

    /// Merge keys into the stored metadata. Fails with `ContextNotFound`
    /// when the user has no context yet.
    pub async fn update_metadata(&self, ctx: &AuthContext, patch: Value) -> AgentResult<AgentContext> {
        let mut context = self
            .repo
            .find_context(&ctx.user_id)
            .await?
            .ok_or(AgentError::ContextNotFound)?;

        context.metadata = merge_metadata(&context.metadata, patch)?;
        context.updated_at = Utc::now();
        self.repo.save_context(&context).await?;
        Ok(context)
    }
}
