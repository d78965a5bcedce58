//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{PurchaseId, UserId};
use kernel::{Language, Pagination};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{Purchase, UsageLog};
use crate::domain::filter::PurchaseExportFilter;
use crate::domain::repository::{
    AccountContact, AccountDirectory, PurchaseRepository, UsageRepository,
};
use crate::domain::value_objects::{PaymentProvider, PurchaseStatus, Tier, UsageKind};
use crate::error::{BillingError, BillingResult};

const PURCHASE_COLUMNS: &str = r#"
    purchase_id,
    user_id,
    tier,
    provider,
    provider_ref,
    amount_cents,
    currency,
    status,
    created_at,
    purchased_at,
    expires_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgBillingRepository {
    pool: PgPool,
}

impl PgBillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_export_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PurchaseExportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.code());
    }
    if let Some(tier) = filter.tier {
        qb.push(" AND tier = ").push_bind(tier.code());
    }
    if let Some(from) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND created_at < ").push_bind(to);
    }
}

// ============================================================================
// Purchase Repository Implementation
// ============================================================================

impl PurchaseRepository for PgBillingRepository {
    async fn create(&self, purchase: &Purchase) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO purchases (
                purchase_id,
                user_id,
                tier,
                provider,
                provider_ref,
                amount_cents,
                currency,
                status,
                created_at,
                purchased_at,
                expires_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(purchase.purchase_id.as_uuid())
        .bind(purchase.user_id.as_uuid())
        .bind(purchase.tier.code())
        .bind(purchase.provider.code())
        .bind(&purchase.provider_ref)
        .bind(purchase.amount_cents)
        .bind(&purchase.currency)
        .bind(purchase.status.code())
        .bind(purchase.created_at)
        .bind(purchase.purchased_at)
        .bind(purchase.expires_at)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_provider_ref(&self, provider_ref: &str) -> BillingResult<Option<Purchase>> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE provider_ref = $1");
        let row = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(provider_ref)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PurchaseRow::into_purchase).transpose()
    }

    async fn list_completed(&self, user_id: &UserId) -> BillingResult<Vec<Purchase>> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE user_id = $1 AND status = 'completed'"
        );
        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(PurchaseRow::into_purchase).collect()
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        pagination: Pagination,
    ) -> BillingResult<(Vec<Purchase>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(pagination.limit_i64())
            .bind(pagination.skip())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(PurchaseRow::into_purchase)
            .collect::<BillingResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn transition(&self, purchase: &Purchase, expected: PurchaseStatus) -> BillingResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE purchases SET
                status = $2,
                purchased_at = $3,
                expires_at = $4,
                updated_at = $5
            WHERE purchase_id = $1 AND status = $6
            "#,
        )
        .bind(purchase.purchase_id.as_uuid())
        .bind(purchase.status.code())
        .bind(purchase.purchased_at)
        .bind(purchase.expires_at)
        .bind(purchase.updated_at)
        .bind(expected.code())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn export(&self, filter: &PurchaseExportFilter) -> BillingResult<Vec<Purchase>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {PURCHASE_COLUMNS} FROM purchases"));
        push_export_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at ASC");

        let rows: Vec<PurchaseRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(PurchaseRow::into_purchase).collect()
    }
}

// ============================================================================
// Usage Repository Implementation
// ============================================================================

impl UsageRepository for PgBillingRepository {
    async fn record(&self, log: &UsageLog) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO usage_logs (usage_log_id, user_id, kind, agent, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(log.usage_log_id.as_uuid())
        .bind(log.user_id.as_uuid())
        .bind(log.kind.code())
        .bind(&log.agent)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_since(
        &self,
        user_id: &UserId,
        kind: UsageKind,
        since: Option<DateTime<Utc>>,
    ) -> BillingResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM usage_logs
            WHERE user_id = $1
              AND kind = $2
              AND ($3::timestamptz IS NULL OR created_at >= $3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(kind.code())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

impl AccountDirectory for PgBillingRepository {
    async fn contact(&self, user_id: &UserId) -> BillingResult<Option<AccountContact>> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT email, preferred_language FROM users WHERE user_id = $1 AND user_status <> 'erased'",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(email, lang)| AccountContact {
            email,
            language: Language::from_code_or_default(Some(&lang)),
        }))
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    purchase_id: Uuid,
    user_id: Uuid,
    tier: String,
    provider: String,
    provider_ref: String,
    amount_cents: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    purchased_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRow {
    fn into_purchase(self) -> BillingResult<Purchase> {
        let unknown = |what: &str, value: &str| BillingError::Internal(format!("Unknown {}: {}", what, value));

        Ok(Purchase {
            purchase_id: PurchaseId::from_uuid(self.purchase_id),
            user_id: UserId::from_uuid(self.user_id),
            tier: Tier::from_code(&self.tier).ok_or_else(|| unknown("tier", &self.tier))?,
            provider: PaymentProvider::from_code(&self.provider)
                .ok_or_else(|| unknown("provider", &self.provider))?,
            status: PurchaseStatus::from_code(&self.status)
                .ok_or_else(|| unknown("purchase status", &self.status))?,
            provider_ref: self.provider_ref,
            amount_cents: self.amount_cents,
            currency: self.currency,
            created_at: self.created_at,
            purchased_at: self.purchased_at,
            expires_at: self.expires_at,
            updated_at: self.updated_at,
        })
    }
}
