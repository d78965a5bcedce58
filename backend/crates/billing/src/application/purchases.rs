//! Purchase history and admin export

use std::sync::Arc;

use kernel::{AuthContext, Paginated, Pagination, UserRole};
use platform::csv::CsvWriter;

use crate::domain::entities::Purchase;
use crate::domain::filter::{PurchaseExportFilter, PurchaseExportQuery};
use crate::domain::repository::PurchaseRepository;
use crate::error::BillingResult;

const EXPORT_HEADER: [&str; 11] = [
    "purchase_id",
    "user_id",
    "tier",
    "provider",
    "provider_ref",
    "amount_cents",
    "currency",
    "status",
    "created_at",
    "purchased_at",
    "expires_at",
];

pub struct PurchasesUseCase<R>
where
    R: PurchaseRepository,
{
    repo: Arc<R>,
}

impl<R> PurchasesUseCase<R>
where
    R: PurchaseRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn mine(
        &self,
        ctx: &AuthContext,
        pagination: Pagination,
    ) -> BillingResult<Paginated<Purchase>> {
        let (items, total) = self.repo.list_by_user(&ctx.user_id, pagination).await?;
        Ok(Paginated::new(items, pagination, total))
    }

    /// Admin CSV export; returns the document and its row count
    pub async fn export(
        &self,
        ctx: &AuthContext,
        query: &PurchaseExportQuery,
    ) -> BillingResult<(String, usize)> {
        ctx.require_role(UserRole::Admin)?;
        let filter = PurchaseExportFilter::parse(query)?;
        let purchases = self.repo.export(&filter).await?;

        let mut csv = CsvWriter::with_header(EXPORT_HEADER)?;
        for p in &purchases {
            csv.push_row([
                p.purchase_id.to_string(),
                p.user_id.to_string(),
                p.tier.code().to_string(),
                p.provider.code().to_string(),
                p.provider_ref.clone(),
                p.amount_cents.to_string(),
                p.currency.clone(),
                p.status.code().to_string(),
                p.created_at.to_rfc3339(),
                p.purchased_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                p.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ])?;
        }

        tracing::info!(admin = %ctx.user_id, rows = purchases.len(), "Purchases exported");
        Ok((csv.finish()?, purchases.len()))
    }
}
