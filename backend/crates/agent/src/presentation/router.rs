//! Agent Router

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use billing::QuotaGate;
use kernel::audit::AuditHandle;
use moderation::ContentScreener;
use std::sync::Arc;

use crate::application::config::AgentConfig;
use crate::domain::ports::AssistantClient;
use crate::domain::repository::{ContextRepository, SignalRepository, ToggleRepository};
use crate::presentation::handlers::{self, AgentAppState};

/// Mounted at `/api/agents`
pub fn agent_router<R, S, Q, C>(
    repo: Arc<R>,
    screener: Arc<S>,
    quota: Arc<Q>,
    assistant: Arc<C>,
    audit: AuditHandle,
    config: AgentConfig,
) -> Router
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let state = AgentAppState {
        repo,
        screener,
        quota,
        assistant,
        audit,
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(handlers::list_agents::<R, S, Q, C>))
        .route(
            "/context",
            get(handlers::get_context::<R, S, Q, C>).put(handlers::update_context::<R, S, Q, C>),
        )
        .route(
            "/context/metadata",
            patch(handlers::update_metadata::<R, S, Q, C>),
        )
        .route("/{agent}/prompt", get(handlers::agent_prompt::<R, S, Q, C>))
        .route("/{agent}/chat", post(handlers::chat::<R, S, Q, C>))
        .route(
            "/admin/toggles/{agent}",
            put(handlers::set_toggle::<R, S, Q, C>),
        )
        .route("/admin/drift", get(handlers::list_drift::<R, S, Q, C>))
        .with_state(state)
}
