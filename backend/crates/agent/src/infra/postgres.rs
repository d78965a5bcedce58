//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{DriftSignalId, UserId};
use kernel::{Language, Pagination};
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{AgentContext, AgentToggle, ConfidenceScore, DriftSignal};
use crate::domain::repository::{ContextRepository, DriftFilter, SignalRepository, ToggleRepository};
use crate::domain::value_objects::{AgentKind, Confidence, DriftKind};
use crate::error::{AgentError, AgentResult};

const CONTEXT_COLUMNS: &str = r#"
    user_id,
    active_agent,
    language,
    metadata,
    last_interaction_at,
    created_at,
    updated_at
"#;

const DRIFT_COLUMNS: &str = "signal_id, agent, language, kind, value, details, created_at";

#[derive(Clone)]
pub struct PgAgentRepository {
    pool: PgPool,
}

impl PgAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_drift_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &DriftFilter) {
    qb.push(" WHERE TRUE");
    if let Some(agent) = filter.agent {
        qb.push(" AND agent = ").push_bind(agent.code());
    }
    if let Some(language) = filter.language {
        qb.push(" AND language = ").push_bind(language.code());
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind.code());
    }
}

fn unknown(what: &str, value: &str) -> AgentError {
    AgentError::Internal(format!("Unknown {}: {}", what, value))
}

fn parse_agent_code(code: &str) -> AgentResult<AgentKind> {
    AgentKind::from_code(code).ok_or_else(|| unknown("agent", code))
}

// ============================================================================
// Toggle Repository Implementation
// ============================================================================

impl ToggleRepository for PgAgentRepository {
    async fn list_toggles(&self) -> AgentResult<Vec<AgentToggle>> {
        let rows = sqlx::query_as::<_, ToggleRow>(
            "SELECT agent, enabled, updated_by, updated_at FROM agent_toggles",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ToggleRow::into_toggle).collect()
    }

    async fn save_toggle(&self, toggle: &AgentToggle) -> AgentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_toggles (agent, enabled, updated_by, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (agent) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                updated_by = EXCLUDED.updated_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(toggle.agent.code())
        .bind(toggle.enabled)
        .bind(toggle.updated_by.map(|id| id.into_uuid()))
        .bind(toggle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Context Repository Implementation
// ============================================================================

impl ContextRepository for PgAgentRepository {
    async fn find_context(&self, user_id: &UserId) -> AgentResult<Option<AgentContext>> {
        let sql = format!("SELECT {CONTEXT_COLUMNS} FROM agent_contexts WHERE user_id = $1");
        let row = sqlx::query_as::<_, ContextRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ContextRow::into_context).transpose()
    }

    async fn save_context(&self, context: &AgentContext) -> AgentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_contexts (
                user_id,
                active_agent,
                language,
                metadata,
                last_interaction_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                active_agent = EXCLUDED.active_agent,
                language = EXCLUDED.language,
                metadata = EXCLUDED.metadata,
                last_interaction_at = EXCLUDED.last_interaction_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(context.user_id.as_uuid())
        .bind(context.active_agent.code())
        .bind(context.language.code())
        .bind(Value::Object(context.metadata.clone()))
        .bind(context.last_interaction_at)
        .bind(context.created_at)
        .bind(context.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Signal Repository Implementation
// ============================================================================

impl SignalRepository for PgAgentRepository {
    async fn record_score(&self, score: &ConfidenceScore) -> AgentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO confidence_scores (score_id, user_id, agent, language, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(score.score_id.as_uuid())
        .bind(score.user_id.map(|id| id.into_uuid()))
        .bind(score.agent.code())
        .bind(score.language.code())
        .bind(score.score.value())
        .bind(score.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_scores(
        &self,
        agent: AgentKind,
        language: Language,
        limit: usize,
    ) -> AgentResult<Vec<Confidence>> {
        let scores: Vec<f64> = sqlx::query_scalar(
            r#"
            SELECT score FROM confidence_scores
            WHERE agent = $1 AND language = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(agent.code())
        .bind(language.code())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores.into_iter().map(Confidence::new).collect())
    }

    async fn record_drift(&self, signal: &DriftSignal) -> AgentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drift_signals (signal_id, agent, language, kind, value, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(signal.signal_id.as_uuid())
        .bind(signal.agent.code())
        .bind(signal.language.code())
        .bind(signal.kind.code())
        .bind(signal.value)
        .bind(&signal.details)
        .bind(signal.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_drift(
        &self,
        filter: &DriftFilter,
        pagination: Pagination,
    ) -> AgentResult<(Vec<DriftSignal>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM drift_signals");
        push_drift_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {DRIFT_COLUMNS} FROM drift_signals"));
        push_drift_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit_i64())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows: Vec<DriftRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(DriftRow::into_signal)
            .collect::<AgentResult<Vec<_>>>()?;
        Ok((items, total))
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ToggleRow {
    agent: String,
    enabled: bool,
    updated_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl ToggleRow {
    fn into_toggle(self) -> AgentResult<AgentToggle> {
        Ok(AgentToggle {
            agent: parse_agent_code(&self.agent)?,
            enabled: self.enabled,
            updated_by: self.updated_by.map(UserId::from_uuid),
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    user_id: Uuid,
    active_agent: String,
    language: String,
    metadata: Value,
    last_interaction_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContextRow {
    fn into_context(self) -> AgentResult<AgentContext> {
        let metadata = match self.metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Err(unknown("metadata shape", &other.to_string())),
        };

        Ok(AgentContext {
            user_id: UserId::from_uuid(self.user_id),
            active_agent: parse_agent_code(&self.active_agent)?,
            language: Language::from_code(&self.language)
                .ok_or_else(|| unknown("language", &self.language))?,
            metadata,
            last_interaction_at: self.last_interaction_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DriftRow {
    signal_id: Uuid,
    agent: String,
    language: String,
    kind: String,
    value: f64,
    details: Value,
    created_at: DateTime<Utc>,
}

impl DriftRow {
    fn into_signal(self) -> AgentResult<DriftSignal> {
        Ok(DriftSignal {
            signal_id: DriftSignalId::from_uuid(self.signal_id),
            agent: parse_agent_code(&self.agent)?,
            language: Language::from_code(&self.language)
                .ok_or_else(|| unknown("language", &self.language))?,
            kind: DriftKind::from_code(&self.kind).ok_or_else(|| unknown("drift kind", &self.kind))?,
            value: self.value,
            details: self.details,
            created_at: self.created_at,
        })
    }
}
