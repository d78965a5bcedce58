//! HTTP Handlers

use axum::extract::{Path, State};
use kernel::audit::AuditHandle;
use kernel::extract::{Json, Query};
use kernel::id::FlagId;
use kernel::{ApiResponse, AuthContext, Paginated, UserRole};
use std::sync::Arc;

use crate::application::{ListFlagsUseCase, ReviewFlagInput, ReviewFlagUseCase};
use crate::domain::filter::FlagQuery;
use crate::domain::ports::ContentStatusUpdater;
use crate::domain::repository::FlagRepository;
use crate::domain::services::{ContentFilter, ScreeningResult};
use crate::domain::value_objects::ReviewDecision;
use crate::error::{ModerationError, ModerationResult};
use crate::presentation::dto::{FlagResponse, ReviewRequest, ScreenRequest};

/// Preview input cap, same as the longest story body
const MAX_SCREEN_CHARS: usize = 20_000;

pub struct ModerationAppState<F, U> {
    pub flags: Arc<F>,
    pub content: Arc<U>,
    pub filter: Arc<ContentFilter>,
    pub audit: AuditHandle,
}

impl<F, U> Clone for ModerationAppState<F, U> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
            content: self.content.clone(),
            filter: self.filter.clone(),
            audit: self.audit.clone(),
        }
    }
}

fn parse_flag_id(raw: &str) -> ModerationResult<FlagId> {
    raw.parse()
        .map_err(|_| ModerationError::Validation("Invalid flag id".into()))
}

/// GET /api/moderation/flags
pub async fn list_flags<F, U>(
    State(state): State<ModerationAppState<F, U>>,
    ctx: AuthContext,
    Query(query): Query<FlagQuery>,
) -> ModerationResult<ApiResponse<Paginated<FlagResponse>>>
where
    F: FlagRepository + Send + Sync + 'static,
    U: ContentStatusUpdater + Send + Sync + 'static,
{
    let page = ListFlagsUseCase::new(state.flags.clone())
        .list(&ctx, &query)
        .await?;
    Ok(ApiResponse::ok(page.map(FlagResponse::from)))
}

/// GET /api/moderation/flags/{id}
pub async fn get_flag<F, U>(
    State(state): State<ModerationAppState<F, U>>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ModerationResult<ApiResponse<FlagResponse>>
where
    F: FlagRepository + Send + Sync + 'static,
    U: ContentStatusUpdater + Send + Sync + 'static,
{
    let flag_id = parse_flag_id(&id)?;
    let flag = ListFlagsUseCase::new(state.flags.clone())
        .get(&ctx, &flag_id)
        .await?;
    Ok(ApiResponse::ok(flag.into()))
}

/// POST /api/moderation/flags/{id}/review
pub async fn review_flag<F, U>(
    State(state): State<ModerationAppState<F, U>>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ModerationResult<ApiResponse<FlagResponse>>
where
    F: FlagRepository + Send + Sync + 'static,
    U: ContentStatusUpdater + Send + Sync + 'static,
{
    let flag_id = parse_flag_id(&id)?;
    let decision = ReviewDecision::from_code(&req.decision).ok_or_else(|| {
        ModerationError::Validation(format!("Unknown decision: {}", req.decision))
    })?;

    let use_case =
        ReviewFlagUseCase::new(state.flags.clone(), state.content.clone(), state.audit.clone());
    let flag = use_case
        .execute(
            &ctx,
            ReviewFlagInput {
                flag_id,
                decision,
                note: req.note,
            },
        )
        .await?;

    Ok(ApiResponse::ok(flag.into()))
}

/// POST /api/moderation/screen
pub async fn screen<F, U>(
    State(state): State<ModerationAppState<F, U>>,
    ctx: AuthContext,
    Json(req): Json<ScreenRequest>,
) -> ModerationResult<ApiResponse<ScreeningResult>>
where
    F: FlagRepository + Send + Sync + 'static,
    U: ContentStatusUpdater + Send + Sync + 'static,
{
    ctx.require_role(UserRole::Moderator)?;
    if req.text.chars().count() > MAX_SCREEN_CHARS {
        return Err(ModerationError::Validation(format!(
            "Text must be at most {} characters",
            MAX_SCREEN_CHARS
        )));
    }

    Ok(ApiResponse::ok(state.filter.screen(&req.text)))
}
