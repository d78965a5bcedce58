//! HTTP Handlers

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use billing::QuotaGate;
use kernel::audit::AuditHandle;
use kernel::extract::{Json, Query};
use kernel::{ApiResponse, AuthContext, Pagination};
use moderation::ContentScreener;
use platform::client::ClientIp;
use serde_json::Value;
use std::sync::Arc;

use crate::application::config::AgentConfig;
use crate::application::{
    AgentCatalogUseCase, AgentContextUseCase, ChatInput, ChatUseCase, DriftQuery,
    DriftReportUseCase, SetToggleUseCase, UpdateContextInput,
};
use crate::domain::ports::AssistantClient;
use crate::domain::repository::{ContextRepository, SignalRepository, ToggleRepository};
use crate::error::AgentResult;
use crate::presentation::dto::{
    AgentContextResponse, ChatRequest, ChatResponse, DriftListQuery, DriftSignalResponse,
    PromptQuery, ToggleRequest, ToggleResponse, UpdateContextRequest,
};

pub struct AgentAppState<R, S, Q, C> {
    pub repo: Arc<R>,
    pub screener: Arc<S>,
    pub quota: Arc<Q>,
    pub assistant: Arc<C>,
    pub audit: AuditHandle,
    pub config: Arc<AgentConfig>,
}

impl<R, S, Q, C> Clone for AgentAppState<R, S, Q, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            screener: self.screener.clone(),
            quota: self.quota.clone(),
            assistant: self.assistant.clone(),
            audit: self.audit.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /api/agents
pub async fn list_agents<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let agents = AgentCatalogUseCase::new(state.repo.clone()).list().await?;
    Ok(ApiResponse::ok(agents))
}

/// GET /api/agents/{agent}/prompt?lang=
pub async fn agent_prompt<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    Path(agent): Path<String>,
    Query(query): Query<PromptQuery>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let prompt = AgentCatalogUseCase::new(state.repo.clone()).prompt(&agent, query.lang.as_deref())?;
    Ok(ApiResponse::ok(prompt))
}

/// GET /api/agents/context
pub async fn get_context<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let context = AgentContextUseCase::new(state.repo.clone()).resolve(&ctx).await?;
    Ok(ApiResponse::ok(AgentContextResponse::from(context)))
}

/// PUT /api/agents/context
pub async fn update_context<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
    Json(req): Json<UpdateContextRequest>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let context = AgentContextUseCase::new(state.repo.clone())
        .update(
            &ctx,
            UpdateContextInput {
                agent: req.agent,
                language: req.language,
            },
        )
        .await?;
    Ok(ApiResponse::ok(AgentContextResponse::from(context)))
}

/// PATCH /api/agents/context/metadata
pub async fn update_metadata<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
    Json(patch): Json<Value>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let context = AgentContextUseCase::new(state.repo.clone())
        .update_metadata(&ctx, patch)
        .await?;
    Ok(ApiResponse::ok(AgentContextResponse::from(context)))
}

/// POST /api/agents/{agent}/chat
pub async fn chat<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
    Path(agent): Path<String>,
    Json(req): Json<ChatRequest>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let use_case = ChatUseCase::new(
        state.repo.clone(),
        state.screener.clone(),
        state.quota.clone(),
        state.assistant.clone(),
        state.config.clone(),
    );
    let outcome = use_case
        .execute(
            &ctx,
            &agent,
            ChatInput {
                message: req.message,
                language: req.language,
            },
        )
        .await?;
    Ok(ApiResponse::ok(ChatResponse::from(outcome)))
}

/// PUT /api/agents/admin/toggles/{agent}
pub async fn set_toggle<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
    ip: ClientIp,
    Path(agent): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let toggle = SetToggleUseCase::new(state.repo.clone(), state.audit.clone())
        .execute(&ctx, &agent, req.enabled, ip.into_string())
        .await?;
    Ok(ApiResponse::ok(ToggleResponse::from(toggle)))
}

/// GET /api/agents/admin/drift
pub async fn list_drift<R, S, Q, C>(
    State(state): State<AgentAppState<R, S, Q, C>>,
    ctx: AuthContext,
    Query(query): Query<DriftListQuery>,
) -> AgentResult<impl IntoResponse>
where
    R: ContextRepository + ToggleRepository + SignalRepository + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    Q: QuotaGate + Send + Sync + 'static,
    C: AssistantClient + Send + Sync + 'static,
{
    let pagination = Pagination::new(query.page, query.limit);
    let page = DriftReportUseCase::new(state.repo.clone())
        .execute(
            &ctx,
            DriftQuery {
                agent: query.agent,
                language: query.language,
                kind: query.kind,
            },
            pagination,
        )
        .await?;
    Ok(ApiResponse::ok(page.map(DriftSignalResponse::from)))
}
