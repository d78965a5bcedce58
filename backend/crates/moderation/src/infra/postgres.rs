//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::Pagination;
use kernel::id::{FlagId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::ModerationFlag;
use crate::domain::filter::FlagFilter;
use crate::domain::repository::FlagRepository;
use crate::domain::value_objects::{ContentType, FlagStatus, RuleCategory, Severity};
use crate::error::{ModerationError, ModerationResult};

const FLAG_COLUMNS: &str = r#"
    flag_id,
    content_type,
    content_id,
    author_id,
    rule_ids,
    categories,
    severity,
    status,
    excerpt,
    reviewer_id,
    resolution_note,
    created_at,
    resolved_at
"#;

#[derive(Clone)]
pub struct PgFlagRepository {
    pool: PgPool,
}

impl PgFlagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append ` WHERE ...` for `filter`, every value bound as a parameter.
pub fn push_flag_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FlagFilter) {
    qb.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.code());
    }
    if let Some(min) = filter.min_severity {
        let severities: Vec<String> = min.and_above().iter().map(|s| s.code().to_string()).collect();
        qb.push(" AND severity = ANY(").push_bind(severities).push(")");
    }
    if let Some(content_type) = filter.content_type {
        qb.push(" AND content_type = ").push_bind(content_type.code());
    }
    if let Some(category) = filter.category {
        qb.push(" AND ")
            .push_bind(category.code())
            .push(" = ANY(categories)");
    }
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at < ").push_bind(to);
    }
    if let Some(pattern) = filter.search_pattern() {
        qb.push(" AND excerpt ILIKE ").push_bind(pattern);
    }
}

impl FlagRepository for PgFlagRepository {
    async fn create(&self, flag: &ModerationFlag) -> ModerationResult<()> {
        let categories: Vec<String> = flag.categories.iter().map(|c| c.code().to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO moderation_flags (
                flag_id,
                content_type,
                content_id,
                author_id,
                rule_ids,
                categories,
                severity,
                status,
                excerpt,
                reviewer_id,
                resolution_note,
                created_at,
                resolved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(flag.flag_id.as_uuid())
        .bind(flag.content_type.code())
        .bind(flag.content_id)
        .bind(flag.author_id.map(|id| id.into_uuid()))
        .bind(&flag.rule_ids)
        .bind(categories)
        .bind(flag.severity.code())
        .bind(flag.status.code())
        .bind(&flag.excerpt)
        .bind(flag.reviewer_id.map(|id| id.into_uuid()))
        .bind(&flag.resolution_note)
        .bind(flag.created_at)
        .bind(flag.resolved_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, flag_id: &FlagId) -> ModerationResult<Option<ModerationFlag>> {
        let sql = format!("SELECT {FLAG_COLUMNS} FROM moderation_flags WHERE flag_id = $1");
        let row = sqlx::query_as::<_, FlagRow>(&sql)
            .bind(flag_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_flag()).transpose()
    }

    async fn list(
        &self,
        filter: &FlagFilter,
        pagination: Pagination,
    ) -> ModerationResult<(Vec<ModerationFlag>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM moderation_flags");
        push_flag_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FLAG_COLUMNS} FROM moderation_flags"
        ));
        push_flag_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, flag_id DESC LIMIT ")
            .push_bind(pagination.limit_i64())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows: Vec<FlagRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let flags = rows
            .into_iter()
            .map(|r| r.into_flag())
            .collect::<ModerationResult<Vec<_>>>()?;

        Ok((flags, total))
    }

    async fn save_review(&self, flag: &ModerationFlag) -> ModerationResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE moderation_flags SET
                status = $2,
                reviewer_id = $3,
                resolution_note = $4,
                resolved_at = $5
            WHERE flag_id = $1 AND status = 'open'
            "#,
        )
        .bind(flag.flag_id.as_uuid())
        .bind(flag.status.code())
        .bind(flag.reviewer_id.map(|id| id.into_uuid()))
        .bind(&flag.resolution_note)
        .bind(flag.resolved_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct FlagRow {
    flag_id: Uuid,
    content_type: String,
    content_id: Uuid,
    author_id: Option<Uuid>,
    rule_ids: Vec<String>,
    categories: Vec<String>,
    severity: String,
    status: String,
    excerpt: String,
    reviewer_id: Option<Uuid>,
    resolution_note: Option<String>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

fn decode<T>(value: &str, what: &str, from_code: impl Fn(&str) -> Option<T>) -> ModerationResult<T> {
    from_code(value).ok_or_else(|| ModerationError::Internal(format!("Unknown {}: {}", what, value)))
}

impl FlagRow {
    fn into_flag(self) -> ModerationResult<ModerationFlag> {
        let categories = self
            .categories
            .iter()
            .map(|c| decode(c, "category", RuleCategory::from_code))
            .collect::<ModerationResult<Vec<_>>>()?;

        Ok(ModerationFlag {
            flag_id: FlagId::from_uuid(self.flag_id),
            content_type: decode(&self.content_type, "content type", ContentType::from_code)?,
            content_id: self.content_id,
            author_id: self.author_id.map(UserId::from_uuid),
            rule_ids: self.rule_ids,
            categories,
            severity: decode(&self.severity, "severity", Severity::from_code)?,
            status: decode(&self.status, "flag status", FlagStatus::from_code)?,
            excerpt: self.excerpt,
            reviewer_id: self.reviewer_id.map(UserId::from_uuid),
            resolution_note: self.resolution_note,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        })
    }
}
