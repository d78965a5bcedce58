//! Repository Traits

use kernel::id::{DsarRequestId, UserId};
use kernel::{Language, Pagination};

use crate::domain::entities::{AccessBundle, AuditLog, DsarRequest, ErasureReport};
use crate::domain::filter::{AuditFilter, DsarFilter};
use crate::domain::value_objects::{DsarKind, DsarStatus};
use crate::error::ComplianceResult;

#[trait_variant::make(DsarRepository: Send)]
pub trait LocalDsarRepository {
    /// Fails with `OpenRequestExists` when the user already has an open
    /// request of the same kind.
    async fn create(&self, request: &DsarRequest) -> ComplianceResult<()>;

    async fn find_by_id(&self, id: &DsarRequestId) -> ComplianceResult<Option<DsarRequest>>;

    async fn find_open(&self, user_id: &UserId, kind: DsarKind) -> ComplianceResult<Option<DsarRequest>>;

    /// Newest first
    async fn list_by_user(&self, user_id: &UserId) -> ComplianceResult<Vec<DsarRequest>>;

    /// Oldest due date first
    async fn list(
        &self,
        filter: &DsarFilter,
        pagination: Pagination,
    ) -> ComplianceResult<(Vec<DsarRequest>, i64)>;

    /// Write the new state if the stored status is still `expected`.
    async fn transition(&self, request: &DsarRequest, expected: DsarStatus) -> ComplianceResult<bool>;
}

#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    async fn insert_batch(&self, logs: &[AuditLog]) -> ComplianceResult<()>;

    /// Newest first
    async fn list(
        &self,
        filter: &AuditFilter,
        pagination: Pagination,
    ) -> ComplianceResult<(Vec<AuditLog>, i64)>;

    /// Oldest first
    async fn export(&self, filter: &AuditFilter) -> ComplianceResult<Vec<AuditLog>>;
}

#[derive(Debug, Clone)]
pub struct SubjectContact {
    pub email: String,
    pub language: Language,
}

/// Personal data held across the other domains
#[trait_variant::make(DataSubjectStore: Send)]
pub trait LocalDataSubjectStore {
    async fn contact(&self, user_id: &UserId) -> ComplianceResult<Option<SubjectContact>>;

    async fn access_bundle(&self, user_id: &UserId) -> ComplianceResult<AccessBundle>;

    /// Runs in one transaction. Purchases are kept for legal retention.
    async fn erase(&self, user_id: &UserId) -> ComplianceResult<ErasureReport>;
}
