//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::{Language, Pagination};

use crate::domain::entities::{Purchase, UsageLog};
use crate::domain::filter::PurchaseExportFilter;
use crate::domain::value_objects::{PurchaseStatus, UsageKind};
use crate::error::BillingResult;

#[trait_variant::make(PurchaseRepository: Send)]
pub trait LocalPurchaseRepository {
    async fn create(&self, purchase: &Purchase) -> BillingResult<()>;

    async fn find_by_provider_ref(&self, provider_ref: &str) -> BillingResult<Option<Purchase>>;

    /// Completed purchases of a user, any expiry
    async fn list_completed(&self, user_id: &UserId) -> BillingResult<Vec<Purchase>>;

    /// Newest first
    async fn list_by_user(
        &self,
        user_id: &UserId,
        pagination: Pagination,
    ) -> BillingResult<(Vec<Purchase>, i64)>;

    /// Write the new status if the stored one is still `expected`.
    /// Returns `false` when another delivery got there first.
    async fn transition(&self, purchase: &Purchase, expected: PurchaseStatus) -> BillingResult<bool>;

    async fn export(&self, filter: &PurchaseExportFilter) -> BillingResult<Vec<Purchase>>;
}

#[trait_variant::make(UsageRepository: Send)]
pub trait LocalUsageRepository {
    async fn record(&self, log: &UsageLog) -> BillingResult<()>;

    /// Entries of `kind` at or after `since` (all time when `None`)
    async fn count_since(
        &self,
        user_id: &UserId,
        kind: UsageKind,
        since: Option<DateTime<Utc>>,
    ) -> BillingResult<i64>;
}

#[derive(Debug, Clone)]
pub struct AccountContact {
    pub email: String,
    pub language: Language,
}

/// Receipt recipients
#[trait_variant::make(AccountDirectory: Send)]
pub trait LocalAccountDirectory {
    async fn contact(&self, user_id: &UserId) -> BillingResult<Option<AccountContact>>;
}
