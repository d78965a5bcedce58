//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AuditLogId, DsarRequestId, UserId};
use kernel::{Language, Pagination};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{AccessBundle, AuditLog, DsarRequest, ErasureReport};
use crate::domain::filter::{AuditFilter, DsarFilter};
use crate::domain::repository::{AuditRepository, DataSubjectStore, DsarRepository, SubjectContact};
use crate::domain::value_objects::{DsarKind, DsarStatus, Regulation};
use crate::error::{ComplianceError, ComplianceResult};

const DSAR_COLUMNS: &str = r#"
    request_id,
    user_id,
    kind,
    regulation,
    status,
    details,
    resolution_note,
    handled_by,
    created_at,
    due_at,
    completed_at,
    updated_at
"#;

const AUDIT_COLUMNS: &str = "audit_log_id, actor_id, action, target_type, target_id, metadata, ip, created_at";

/// Name written over an erased user's display name
const ERASED_DISPLAY_NAME: &str = "Deleted user";

#[derive(Clone)]
pub struct PgComplianceRepository {
    pool: PgPool,
}

impl PgComplianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_dsar_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &DsarFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.code());
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind.code());
    }
    if let Some(now) = filter.overdue_at {
        qb.push(" AND status IN ('received', 'in_progress') AND due_at < ")
            .push_bind(now);
    }
}

fn push_audit_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    qb.push(" WHERE TRUE");
    if let Some(actor_id) = filter.actor_id {
        qb.push(" AND actor_id = ").push_bind(actor_id.into_uuid());
    }
    if let Some(action) = &filter.action {
        if filter.action_is_prefix() {
            qb.push(" AND action LIKE ").push_bind(format!("{}%", escape_like(action)));
        } else {
            qb.push(" AND action = ").push_bind(action.clone());
        }
    }
    if let Some(target_type) = &filter.target_type {
        qb.push(" AND target_type = ").push_bind(target_type.clone());
    }
    if let Some(target_id) = &filter.target_id {
        qb.push(" AND target_id = ").push_bind(target_id.clone());
    }
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at < ").push_bind(to);
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// ============================================================================
// DSAR Repository Implementation
// ============================================================================

impl DsarRepository for PgComplianceRepository {
    async fn create(&self, request: &DsarRequest) -> ComplianceResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO dsar_requests (
                request_id,
                user_id,
                kind,
                regulation,
                status,
                details,
                resolution_note,
                handled_by,
                created_at,
                due_at,
                completed_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(request.request_id.as_uuid())
        .bind(request.user_id.as_uuid())
        .bind(request.kind.code())
        .bind(request.regulation.code())
        .bind(request.status.code())
        .bind(&request.details)
        .bind(&request.resolution_note)
        .bind(request.handled_by.map(|id| id.into_uuid()))
        .bind(request.created_at)
        .bind(request.due_at)
        .bind(request.completed_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // dsar_requests_one_open_per_kind
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(ComplianceError::OpenRequestExists(request.kind))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &DsarRequestId) -> ComplianceResult<Option<DsarRequest>> {
        let sql = format!("SELECT {DSAR_COLUMNS} FROM dsar_requests WHERE request_id = $1");
        let row = sqlx::query_as::<_, DsarRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(DsarRow::into_request).transpose()
    }

    async fn find_open(&self, user_id: &UserId, kind: DsarKind) -> ComplianceResult<Option<DsarRequest>> {
        let sql = format!(
            "SELECT {DSAR_COLUMNS} FROM dsar_requests \
             WHERE user_id = $1 AND kind = $2 AND status IN ('received', 'in_progress')"
        );
        let row = sqlx::query_as::<_, DsarRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(kind.code())
            .fetch_optional(&self.pool)
            .await?;

        row.map(DsarRow::into_request).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> ComplianceResult<Vec<DsarRequest>> {
        let sql = format!(
            "SELECT {DSAR_COLUMNS} FROM dsar_requests WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, DsarRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DsarRow::into_request).collect()
    }

    async fn list(
        &self,
        filter: &DsarFilter,
        pagination: Pagination,
    ) -> ComplianceResult<(Vec<DsarRequest>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM dsar_requests");
        push_dsar_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {DSAR_COLUMNS} FROM dsar_requests"));
        push_dsar_filter(&mut qb, filter);
        qb.push(" ORDER BY due_at ASC LIMIT ")
            .push_bind(pagination.limit_i64())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows: Vec<DsarRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(DsarRow::into_request)
            .collect::<ComplianceResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn transition(&self, request: &DsarRequest, expected: DsarStatus) -> ComplianceResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE dsar_requests SET
                status = $2,
                resolution_note = $3,
                handled_by = $4,
                completed_at = $5,
                updated_at = $6
            WHERE request_id = $1 AND status = $7
            "#,
        )
        .bind(request.request_id.as_uuid())
        .bind(request.status.code())
        .bind(&request.resolution_note)
        .bind(request.handled_by.map(|id| id.into_uuid()))
        .bind(request.completed_at)
        .bind(request.updated_at)
        .bind(expected.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Audit Repository Implementation
// ============================================================================

impl AuditRepository for PgComplianceRepository {
    async fn insert_batch(&self, logs: &[AuditLog]) -> ComplianceResult<()> {
        if logs.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO audit_logs ({AUDIT_COLUMNS}) "));
        qb.push_values(logs, |mut row, log| {
            row.push_bind(log.id.into_uuid())
                .push_bind(log.actor_id.map(|id| id.into_uuid()))
                .push_bind(log.action.clone())
                .push_bind(log.target_type.clone())
                .push_bind(log.target_id.clone())
                .push_bind(log.metadata.clone())
                .push_bind(log.ip.clone())
                .push_bind(log.created_at);
        });
        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn list(
        &self,
        filter: &AuditFilter,
        pagination: Pagination,
    ) -> ComplianceResult<(Vec<AuditLog>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
        push_audit_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs"));
        push_audit_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit_i64())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows: Vec<AuditRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok((rows.into_iter().map(AuditRow::into_log).collect(), total))
    }

    async fn export(&self, filter: &AuditFilter) -> ComplianceResult<Vec<AuditLog>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs"));
        push_audit_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at ASC");

        let rows: Vec<AuditRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(AuditRow::into_log).collect())
    }
}

// ============================================================================
// Data Subject Store Implementation
// ============================================================================

impl PgComplianceRepository {
    /// One JSON object per row of `select`, which takes the user id as `$1`.
    async fn json_rows(&self, select: &str, user_id: &UserId) -> ComplianceResult<Vec<Value>> {
        let sql = format!("SELECT to_jsonb(t) FROM ({select}) t");
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

impl DataSubjectStore for PgComplianceRepository {
    async fn contact(&self, user_id: &UserId) -> ComplianceResult<Option<SubjectContact>> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT email, preferred_language FROM users WHERE user_id = $1 AND user_status <> 'erased'",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(email, lang)| SubjectContact {
            email,
            language: Language::from_code_or_default(Some(&lang)),
        }))
    }

    async fn access_bundle(&self, user_id: &UserId) -> ComplianceResult<AccessBundle> {
        let profile = self
            .json_rows(
                "SELECT user_id, email, display_name, user_role, user_status, preferred_language, \
                 last_login_at, created_at, updated_at FROM users WHERE user_id = $1",
                user_id,
            )
            .await?
            .into_iter()
            .next()
            .unwrap_or(Value::Null);

        let stories = self
            .json_rows(
                "SELECT story_id, title, body, language, category_slug, country_of_origin, \
                 destination_country, is_anonymous, status, created_at, published_at \
                 FROM stories WHERE author_id = $1 ORDER BY created_at",
                user_id,
            )
            .await?;
        let purchases = self
            .json_rows(
                "SELECT purchase_id, tier, provider, amount_cents, currency, status, created_at, \
                 purchased_at, expires_at FROM purchases WHERE user_id = $1 ORDER BY created_at",
                user_id,
            )
            .await?;
        let usage_logs = self
            .json_rows(
                "SELECT kind, agent, created_at FROM usage_logs WHERE user_id = $1 ORDER BY created_at",
                user_id,
            )
            .await?;
        let agent_context = self
            .json_rows(
                "SELECT active_agent, language, metadata, last_interaction_at, updated_at \
                 FROM agent_contexts WHERE user_id = $1",
                user_id,
            )
            .await?
            .into_iter()
            .next();
        let dsar_requests = self
            .json_rows(
                "SELECT request_id, kind, regulation, status, details, resolution_note, created_at, \
                 due_at, completed_at FROM dsar_requests WHERE user_id = $1 ORDER BY created_at",
                user_id,
            )
            .await?;

        Ok(AccessBundle {
            generated_at: Utc::now(),
            profile,
            stories,
            purchases,
            usage_logs,
            agent_context,
            dsar_requests,
        })
    }

    async fn erase(&self, user_id: &UserId) -> ComplianceResult<ErasureReport> {
        let uid = user_id.as_uuid();
        let mut tx = self.pool.begin().await?;

        let stories_anonymised = sqlx::query(
            "UPDATE stories SET author_id = NULL, is_anonymous = TRUE, updated_at = now() WHERE author_id = $1",
        )
        .bind(uid)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let agent_contexts_deleted = sqlx::query("DELETE FROM agent_contexts WHERE user_id = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let confidence_scores_deleted = sqlx::query("DELETE FROM confidence_scores WHERE user_id = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let usage_logs_deleted = sqlx::query("DELETE FROM usage_logs WHERE user_id = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let media_detached = sqlx::query(
            "UPDATE media SET owner_id = NULL, original_filename = NULL WHERE owner_id = $1",
        )
        .bind(uid)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let flags_detached = sqlx::query("UPDATE moderation_flags SET author_id = NULL WHERE author_id = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM user_credentials WHERE user_id = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users SET
                user_status = 'erased',
                email = 'erased+' || user_id::text || '@invalid',
                display_name = $2,
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(uid)
        .bind(ERASED_DISPLAY_NAME)
        .execute(&mut *tx)
        .await?;

        let purchases_retained: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE user_id = $1")
            .bind(uid)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ErasureReport {
            stories_anonymised,
            agent_contexts_deleted,
            confidence_scores_deleted,
            usage_logs_deleted,
            media_detached,
            flags_detached,
            purchases_retained: purchases_retained.max(0) as u64,
        })
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct DsarRow {
    request_id: Uuid,
    user_id: Uuid,
    kind: String,
    regulation: String,
    status: String,
    details: Option<String>,
    resolution_note: Option<String>,
    handled_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl DsarRow {
    fn into_request(self) -> ComplianceResult<DsarRequest> {
        let unknown = |what: &str, value: &str| ComplianceError::Internal(format!("Unknown {}: {}", what, value));

        Ok(DsarRequest {
            request_id: DsarRequestId::from_uuid(self.request_id),
            user_id: UserId::from_uuid(self.user_id),
            kind: DsarKind::from_code(&self.kind).ok_or_else(|| unknown("request kind", &self.kind))?,
            regulation: Regulation::from_code(&self.regulation)
                .ok_or_else(|| unknown("regulation", &self.regulation))?,
            status: DsarStatus::from_code(&self.status).ok_or_else(|| unknown("status", &self.status))?,
            details: self.details,
            resolution_note: self.resolution_note,
            handled_by: self.handled_by.map(UserId::from_uuid),
            created_at: self.created_at,
            due_at: self.due_at,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    audit_log_id: Uuid,
    actor_id: Option<Uuid>,
    action: String,
    target_type: String,
    target_id: Option<String>,
    metadata: Value,
    ip: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_log(self) -> AuditLog {
        AuditLog {
            id: AuditLogId::from_uuid(self.audit_log_id),
            actor_id: self.actor_id.map(UserId::from_uuid),
            action: self.action,
            target_type: self.target_type,
            target_id: self.target_id,
            metadata: self.metadata,
            ip: self.ip,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{AuditQuery, DsarListQuery};

    #[test]
    fn test_overdue_filter_sql() {
        let filter = DsarFilter::parse(
            &DsarListQuery {
                kind: Some("erasure".into()),
                overdue: Some(true),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM dsar_requests");
        push_dsar_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM dsar_requests WHERE TRUE AND kind = $1 \
             AND status IN ('received', 'in_progress') AND due_at < $2"
        );
    }

    #[test]
    fn test_audit_filter_sql() {
        let filter = AuditFilter::parse(&AuditQuery {
            action: Some("dsar.".into()),
            target_type: Some("dsar_request".into()),
            ..Default::default()
        })
        .unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM audit_logs");
        push_audit_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM audit_logs WHERE TRUE AND action LIKE $1 AND target_type = $2"
        );
    }

    #[test]
    fn test_like_escaping() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
