//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, MediaId, StoryId, UserId};
use kernel::{Language, Pagination};
use moderation::{ContentDecision, ContentStatusUpdater, ContentType, ModerationError, ModerationResult, Severity};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{Category, Media, Story};
use crate::domain::filter::{ExportFilter, StoryFilter};
use crate::domain::repository::{
    AuthorContact, AuthorDirectory, CategoryRepository, MediaRepository, StoryRepository,
};
use crate::domain::value_objects::{CategorySlug, CountryCode, StoryBody, StoryStatus, StoryTitle};
use crate::error::{UgcError, UgcResult};

const STORY_COLUMNS: &str = r#"
    story_id,
    author_id,
    title,
    body,
    language,
    category_slug,
    country_of_origin,
    destination_country,
    is_anonymous,
    media_ids,
    status,
    moderation_severity,
    created_at,
    updated_at,
    published_at
"#;

#[derive(Clone)]
pub struct PgUgcRepository {
    pool: PgPool,
}

impl PgUgcRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the public listing `WHERE` clause for `filter`.
pub fn push_story_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &StoryFilter) {
    qb.push(" WHERE status = 'published'");

    if let Some(language) = filter.language {
        qb.push(" AND language = ").push_bind(language.code());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category_slug = ")
            .push_bind(category.as_str().to_string());
    }
    if let Some(country) = &filter.country {
        let code = country.as_str().to_string();
        qb.push(" AND (country_of_origin = ")
            .push_bind(code.clone())
            .push(" OR destination_country = ")
            .push_bind(code)
            .push(")");
    }
    if let Some(pattern) = filter.search_pattern() {
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR body ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_export_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ExportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.code());
    }
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at < ").push_bind(to);
    }
}

fn collect_stories(rows: Vec<StoryRow>) -> UgcResult<Vec<Story>> {
    rows.into_iter().map(StoryRow::into_story).collect()
}

// ============================================================================
// Story Repository Implementation
// ============================================================================

impl StoryRepository for PgUgcRepository {
    async fn create(&self, story: &Story) -> UgcResult<()> {
        let media_ids: Vec<Uuid> = story.media_ids.iter().map(|id| id.into_uuid()).collect();

        sqlx::query(
            r#"
            INSERT INTO stories (
                story_id,
                author_id,
                title,
                body,
                language,
                category_slug,
                country_of_origin,
                destination_country,
                is_anonymous,
                media_ids,
                status,
                moderation_severity,
                created_at,
                updated_at,
                published_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(story.story_id.as_uuid())
        .bind(story.author_id.map(|id| id.into_uuid()))
        .bind(story.title.as_str())
        .bind(story.body.as_str())
        .bind(story.language.code())
        .bind(story.category_slug.as_str())
        .bind(story.country_of_origin.as_ref().map(|c| c.as_str()))
        .bind(story.destination_country.as_ref().map(|c| c.as_str()))
        .bind(story.is_anonymous)
        .bind(media_ids)
        .bind(story.status.code())
        .bind(story.moderation_severity.map(|s| s.code()))
        .bind(story.created_at)
        .bind(story.updated_at)
        .bind(story.published_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, story_id: &StoryId) -> UgcResult<Option<Story>> {
        let sql = format!("SELECT {STORY_COLUMNS} FROM stories WHERE story_id = $1");
        let row = sqlx::query_as::<_, StoryRow>(&sql)
            .bind(story_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(StoryRow::into_story).transpose()
    }

    async fn list_published(
        &self,
        filter: &StoryFilter,
        pagination: Pagination,
    ) -> UgcResult<(Vec<Story>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM stories");
        push_story_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {STORY_COLUMNS} FROM stories"));
        push_story_filter(&mut select, filter);
        select
            .push(" ORDER BY published_at DESC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(pagination.limit_i64())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows: Vec<StoryRow> = select.build_query_as().fetch_all(&self.pool).await?;
        Ok((collect_stories(rows)?, total))
    }

    async fn list_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> UgcResult<(Vec<Story>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stories WHERE author_id = $1")
            .bind(author_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE author_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, StoryRow>(&sql)
            .bind(author_id.as_uuid())
            .bind(pagination.limit_i64())
            .bind(pagination.skip())
            .fetch_all(&self.pool)
            .await?;

        Ok((collect_stories(rows)?, total))
    }

    async fn update_status(&self, story: &Story) -> UgcResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE stories SET
                status = $2,
                published_at = $3,
                updated_at = $4
            WHERE story_id = $1
            "#,
        )
        .bind(story.story_id.as_uuid())
        .bind(story.status.code())
        .bind(story.published_at)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn export(&self, filter: &ExportFilter) -> UgcResult<Vec<Story>> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {STORY_COLUMNS} FROM stories"));
        push_export_filter(&mut select, filter);
        select.push(" ORDER BY created_at ASC");

        let rows: Vec<StoryRow> = select.build_query_as().fetch_all(&self.pool).await?;
        collect_stories(rows)
    }
}

// ============================================================================
// Category Repository Implementation
// ============================================================================

impl CategoryRepository for PgUgcRepository {
    async fn list_active(&self) -> UgcResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category_id, slug, name, description, sort_order, is_active, created_at
            FROM story_categories
            WHERE is_active
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn find_by_slug(&self, slug: &CategorySlug) -> UgcResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category_id, slug, name, description, sort_order, is_active, created_at
            FROM story_categories
            WHERE slug = $1
            "#,
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn create(&self, category: &Category) -> UgcResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO story_categories (
                category_id, slug, name, description, sort_order, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(category.category_id.as_uuid())
        .bind(category.slug.as_str())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }
}

// ============================================================================
// Media Repository Implementation
// ============================================================================

impl MediaRepository for PgUgcRepository {
    async fn create(&self, media: &Media) -> UgcResult<()> {
        sqlx::query(
            r#"
            INSERT INTO media (
                media_id, owner_id, storage_path, mime_type, size_bytes, sha256,
                original_filename, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(media.media_id.as_uuid())
        .bind(media.owner_id.map(|id| id.into_uuid()))
        .bind(&media.storage_path)
        .bind(&media.mime_type)
        .bind(media.size_bytes)
        .bind(&media.sha256)
        .bind(&media.original_filename)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_owned(&self, ids: &[MediaId], owner: &UserId) -> UgcResult<Vec<Media>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT media_id, owner_id, storage_path, mime_type, size_bytes, sha256,
                   original_filename, created_at
            FROM media
            WHERE media_id = ANY($1) AND owner_id = $2
            "#,
        )
        .bind(ids)
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRow::into_media).collect())
    }
}

// ============================================================================
// Author lookup
// ============================================================================

impl AuthorDirectory for PgUgcRepository {
    async fn contact(&self, user_id: &UserId) -> UgcResult<Option<AuthorContact>> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT email, preferred_language FROM users WHERE user_id = $1 AND user_status <> 'erased'",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(email, lang)| AuthorContact {
            email,
            language: Language::from_code_or_default(Some(&lang)),
        }))
    }
}

// ============================================================================
// Moderation decisions
// ============================================================================

impl ContentStatusUpdater for PgUgcRepository {
    async fn apply_decision(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        decision: ContentDecision,
    ) -> ModerationResult<bool> {
        if content_type != ContentType::Story {
            return Ok(false);
        }

        let story_id = StoryId::from_uuid(content_id);
        let mut story = match StoryRepository::find_by_id(self, &story_id).await {
            Ok(Some(story)) => story,
            Ok(None) => return Ok(false),
            Err(e) => return Err(ModerationError::Internal(e.to_string())),
        };

        story.apply_decision(decision);
        StoryRepository::update_status(self, &story)
            .await
            .map_err(|e| ModerationError::Internal(e.to_string()))
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct StoryRow {
    story_id: Uuid,
    author_id: Option<Uuid>,
    title: String,
    body: String,
    language: String,
    category_slug: String,
    country_of_origin: Option<String>,
    destination_country: Option<String>,
    is_anonymous: bool,
    media_ids: Vec<Uuid>,
    status: String,
    moderation_severity: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl StoryRow {
    fn into_story(self) -> UgcResult<Story> {
        let status = StoryStatus::from_code(&self.status)
            .ok_or_else(|| UgcError::Internal(format!("Unknown story status: {}", self.status)))?;

        Ok(Story {
            story_id: StoryId::from_uuid(self.story_id),
            author_id: self.author_id.map(UserId::from_uuid),
            title: StoryTitle::from_db(self.title),
            body: StoryBody::from_db(self.body),
            language: Language::from_code_or_default(Some(&self.language)),
            category_slug: CategorySlug::from_db(self.category_slug),
            country_of_origin: self.country_of_origin.map(CountryCode::from_db),
            destination_country: self.destination_country.map(CountryCode::from_db),
            is_anonymous: self.is_anonymous,
            media_ids: self.media_ids.into_iter().map(MediaId::from_uuid).collect(),
            status,
            moderation_severity: self
                .moderation_severity
                .as_deref()
                .and_then(Severity::from_code),
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    slug: String,
    name: String,
    description: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            category_id: CategoryId::from_uuid(self.category_id),
            slug: CategorySlug::from_db(self.slug),
            name: self.name,
            description: self.description,
            sort_order: self.sort_order,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    media_id: Uuid,
    owner_id: Option<Uuid>,
    storage_path: String,
    mime_type: String,
    size_bytes: i64,
    sha256: String,
    original_filename: Option<String>,
    created_at: DateTime<Utc>,
}

impl MediaRow {
    fn into_media(self) -> Media {
        Media {
            media_id: MediaId::from_uuid(self.media_id),
            owner_id: self.owner_id.map(UserId::from_uuid),
            storage_path: self.storage_path,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            sha256: self.sha256,
            original_filename: self.original_filename,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::StoryQuery;

    #[test]
    fn test_public_listing_sql() {
        let filter = StoryFilter::parse(&StoryQuery {
            language: Some("fr".into()),
            country: Some("ca".into()),
            search: Some("permis".into()),
            ..Default::default()
        })
        .unwrap();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM stories");
        push_story_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM stories WHERE status = 'published' \
             AND language = $1 \
             AND (country_of_origin = $2 OR destination_country = $3) \
             AND (title ILIKE $4 OR body ILIKE $5)"
        );
    }
}
