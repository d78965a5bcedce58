//! HTTP Handlers

use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use kernel::audit::AuditHandle;
use kernel::extract::{Json, Query};
use kernel::id::StoryId;
use kernel::{ApiResponse, AuthContext, Pagination};
use moderation::ContentScreener;
use platform::client::ClientIp;
use platform::csv::{CSV_CONTENT_TYPE, export_filename};
use platform::mailer::Mailer;
use std::sync::Arc;

use crate::application::config::UgcConfig;
use crate::application::{
    BrowseStoriesUseCase, CreateCategoryInput, ExportStoriesUseCase, ManageCategoriesUseCase,
    SubmitStoryInput, SubmitStoryUseCase, UploadMediaInput, UploadMediaUseCase,
};
use crate::domain::filter::{ExportQuery, StoryQuery};
use crate::domain::repository::{
    AuthorDirectory, CategoryRepository, MediaRepository, MediaStorage, StoryRepository,
};
use crate::error::{UgcError, UgcResult};
use crate::presentation::dto::{
    CategoryResponse, CategoryStoriesResponse, CreateCategoryRequest, MediaResponse, PageQuery,
    StoryResponse, SubmitStoryRequest,
};

/// Multipart field carrying the upload
const UPLOAD_FIELD: &str = "file";

/// Shared state for story and media handlers
pub struct UgcAppState<R, S, M, F> {
    pub repo: Arc<R>,
    pub screener: Arc<S>,
    pub mailer: Arc<M>,
    pub storage: Arc<F>,
    pub audit: AuditHandle,
    pub config: Arc<UgcConfig>,
}

impl<R, S, M, F> Clone for UgcAppState<R, S, M, F> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            screener: self.screener.clone(),
            mailer: self.mailer.clone(),
            storage: self.storage.clone(),
            audit: self.audit.clone(),
            config: self.config.clone(),
        }
    }
}

fn parse_story_id(raw: &str) -> UgcResult<StoryId> {
    raw.parse().map_err(|_| UgcError::StoryNotFound)
}

// ============================================================================
// Public reads
// ============================================================================

/// GET /api/stories
pub async fn list_stories<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    Query(query): Query<StoryQuery>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let page = BrowseStoriesUseCase::new(state.repo.clone()).list(&query).await?;
    Ok(ApiResponse::ok(page.map(StoryResponse::from)))
}

/// GET /api/stories/categories
pub async fn list_categories<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let categories = BrowseStoriesUseCase::new(state.repo.clone()).categories().await?;
    Ok(ApiResponse::ok(
        categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/stories/category/{slug}
pub async fn stories_by_category<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    Path(slug): Path<String>,
    Query(query): Query<StoryQuery>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let (category, page) = BrowseStoriesUseCase::new(state.repo.clone())
        .list_by_category(&slug, &query)
        .await?;
    Ok(ApiResponse::ok(CategoryStoriesResponse {
        category: category.into(),
        stories: page.map(StoryResponse::from),
    }))
}

/// GET /api/stories/{id}
pub async fn get_story<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: Option<AuthContext>,
    Path(id): Path<String>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let story_id = parse_story_id(&id)?;
    let story = BrowseStoriesUseCase::new(state.repo.clone())
        .get(ctx.as_ref(), &story_id)
        .await?;
    Ok(ApiResponse::ok(StoryResponse::from(story)))
}

// ============================================================================
// Authenticated writes
// ============================================================================

/// POST /api/stories
pub async fn submit_story<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: AuthContext,
    ip: ClientIp,
    Json(req): Json<SubmitStoryRequest>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + MediaRepository + AuthorDirectory + Send + Sync + 'static,
    S: ContentScreener + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let use_case = SubmitStoryUseCase::new(
        state.repo.clone(),
        state.screener.clone(),
        state.mailer.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    let story = use_case
        .execute(
            &ctx,
            SubmitStoryInput {
                title: req.title,
                body: req.body,
                language: req.language,
                category: req.category,
                country_of_origin: req.country_of_origin,
                destination_country: req.destination_country,
                is_anonymous: req.is_anonymous,
                media_ids: req.media_ids,
                ip: ip.into_string(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(StoryResponse::from(story))))
}

/// GET /api/ugc/mine
pub async fn my_stories<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: AuthContext,
    Query(query): Query<PageQuery>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let pagination = Pagination::new(query.page, query.limit);
    let page = BrowseStoriesUseCase::new(state.repo.clone())
        .mine(&ctx, pagination)
        .await?;
    Ok(ApiResponse::ok(page.map(StoryResponse::from)))
}

/// POST /api/ugc/media-upload
pub async fn upload_media<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: AuthContext,
    ip: ClientIp,
    mut multipart: Multipart,
) -> UgcResult<impl IntoResponse>
where
    R: MediaRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: MediaStorage + Send + Sync + 'static,
{
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UgcError::Validation(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UgcError::Validation(e.body_text()))?;
        file = Some((bytes, declared_type, filename));
        break;
    }

    let (bytes, declared_type, filename) = file.ok_or_else(|| {
        UgcError::Validation(format!("Missing multipart field '{}'", UPLOAD_FIELD))
    })?;
    let input = UploadMediaInput {
        bytes: bytes.to_vec(),
        declared_type,
        filename,
        ip: ip.into_string(),
    };

    let use_case = UploadMediaUseCase::new(
        state.repo.clone(),
        state.storage.clone(),
        state.audit.clone(),
        state.config.clone(),
    );
    let media = use_case.execute(&ctx, input).await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(MediaResponse::from(media))))
}

// ============================================================================
// Admin
// ============================================================================

/// POST /api/ugc/admin/categories
pub async fn create_category<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: AuthContext,
    Json(req): Json<CreateCategoryRequest>,
) -> UgcResult<impl IntoResponse>
where
    R: CategoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let category = ManageCategoriesUseCase::new(state.repo.clone(), state.audit.clone())
        .create(
            &ctx,
            CreateCategoryInput {
                slug: req.slug,
                name: req.name,
                description: req.description,
                sort_order: req.sort_order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(CategoryResponse::from(category))))
}

/// GET /api/ugc/admin/stories/export
pub async fn export_stories<R, S, M, F>(
    State(state): State<UgcAppState<R, S, M, F>>,
    ctx: AuthContext,
    Query(query): Query<ExportQuery>,
) -> UgcResult<impl IntoResponse>
where
    R: StoryRepository + Send + Sync + 'static,
    S: Send + Sync + 'static,
    M: Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    let (csv, _rows) = ExportStoriesUseCase::new(state.repo.clone())
        .execute(&ctx, &query)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename("stories", Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
