//! UGC Routers

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use kernel::audit::AuditHandle;
use moderation::ContentScreener;
use platform::mailer::Mailer;
use std::sync::Arc;

use crate::application::config::UgcConfig;
use crate::domain::repository::{
    AuthorDirectory, CategoryRepository, MediaRepository, MediaStorage, StoryRepository,
};
use crate::presentation::handlers::{self, UgcAppState};

/// Multipart framing allowance on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn app_state<R, S, M, F>(
    repo: Arc<R>,
    screener: Arc<S>,
    mailer: Arc<M>,
    storage: Arc<F>,
    audit: AuditHandle,
    config: Arc<UgcConfig>,
) -> UgcAppState<R, S, M, F> {
    UgcAppState {
        repo,
        screener,
        mailer,
        storage,
        audit,
        config,
    }
}

/// Mounted at `/api/stories`
pub fn stories_router<R, S, M, F>(
    repo: Arc<R>,
    screener: Arc<S>,
    mailer: Arc<M>,
    storage: Arc<F>,
    audit: AuditHandle,
    config: Arc<UgcConfig>,
) -> Router
where
    R: StoryRepository
        + CategoryRepository
        + MediaRepository
        + AuthorDirectory
        + Send
        + Sync
        + 'static,
    S: ContentScreener + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    F: MediaStorage + Send + Sync + 'static,
{
    let state = app_state(repo, screener, mailer, storage, audit, config);

    Router::new()
        .route(
            "/",
            get(handlers::list_stories::<R, S, M, F>).post(handlers::submit_story::<R, S, M, F>),
        )
        .route("/categories", get(handlers::list_categories::<R, S, M, F>))
        .route(
            "/category/{slug}",
            get(handlers::stories_by_category::<R, S, M, F>),
        )
        .route("/{id}", get(handlers::get_story::<R, S, M, F>))
        .with_state(state)
}

/// Mounted at `/api/ugc`
pub fn ugc_router<R, S, M, F>(
    repo: Arc<R>,
    screener: Arc<S>,
    mailer: Arc<M>,
    storage: Arc<F>,
    audit: AuditHandle,
    config: Arc<UgcConfig>,
) -> Router
where
    R: StoryRepository
        + CategoryRepository
        + MediaRepository
        + AuthorDirectory
        + Send
        + Sync
        + 'static,
    S: ContentScreener + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    F: MediaStorage + Send + Sync + 'static,
{
    let body_limit = config.upload.max_bytes + MULTIPART_OVERHEAD_BYTES;
    let state = app_state(repo, screener, mailer, storage, audit, config);

    Router::new()
        .route("/mine", get(handlers::my_stories::<R, S, M, F>))
        .route(
            "/media-upload",
            post(handlers::upload_media::<R, S, M, F>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/admin/categories",
            post(handlers::create_category::<R, S, M, F>),
        )
        .route(
            "/admin/stories/export",
            get(handlers::export_stories::<R, S, M, F>),
        )
        .with_state(state)
}
