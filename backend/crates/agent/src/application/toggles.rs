//! Agent Toggle Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::audit::{AuditEvent, AuditHandle};
use kernel::{AuthContext, UserRole};
use serde_json::json;

use crate::application::catalog::parse_agent;
use crate::domain::entities::AgentToggle;
use crate::domain::repository::ToggleRepository;
use crate::error::AgentResult;

pub struct SetToggleUseCase<R>
where
    R: ToggleRepository,
{
    repo: Arc<R>,
    audit: AuditHandle,
}

impl<R> SetToggleUseCase<R>
where
    R: ToggleRepository + Sync,
{
    pub fn new(repo: Arc<R>, audit: AuditHandle) -> Self {
        Self { repo, audit }
    }

    pub async fn execute(
        &self,
        ctx: &AuthContext,
        agent: &str,
        enabled: bool,
        ip: Option<String>,
    ) -> AgentResult<AgentToggle> {
        ctx.require_role(UserRole::Admin)?;
        let agent = parse_agent(agent)?;

        let toggle = AgentToggle {
            agent,
            enabled,
            updated_by: Some(ctx.user_id),
            updated_at: Utc::now(),
        };
        self.repo.save_toggle(&toggle).await?;

        tracing::info!(agent = %agent, enabled, admin_id = %ctx.user_id, "Agent toggled");
        self.audit.record(
            AuditEvent::new(if enabled { "agent.enabled" } else { "agent.disabled" }, "agent")
                .actor(ctx.user_id)
                .target(agent)
                .metadata(json!({ "enabled": enabled }))
                .ip(ip),
        );

        Ok(toggle)
    }
}
