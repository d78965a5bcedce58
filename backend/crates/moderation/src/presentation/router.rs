//! Moderation Router

use axum::{
    Router,
    routing::{get, post},
};
use kernel::audit::AuditHandle;
use std::sync::Arc;

use crate::domain::ports::ContentStatusUpdater;
use crate::domain::repository::FlagRepository;
use crate::domain::services::ContentFilter;
use crate::presentation::handlers::{self, ModerationAppState};

/// Mounted at `/api/moderation`. `content` applies review decisions to the
/// flagged content.
pub fn moderation_router<F, U>(
    flags: Arc<F>,
    content: Arc<U>,
    filter: Arc<ContentFilter>,
    audit: AuditHandle,
) -> Router
where
    F: FlagRepository + Send + Sync + 'static,
    U: ContentStatusUpdater + Send + Sync + 'static,
{
    let state = ModerationAppState {
        flags,
        content,
        filter,
        audit,
    };

    Router::new()
        .route("/flags", get(handlers::list_flags::<F, U>))
        .route("/flags/{id}", get(handlers::get_flag::<F, U>))
        .route("/flags/{id}/review", post(handlers::review_flag::<F, U>))
        .route("/screen", post(handlers::screen::<F, U>))
        .with_state(state)
}
