//! Ports used by other crates
//!
//! Metered features elsewhere (agent chat) consume quota through
//! [`QuotaGate`] and never touch usage logs directly.

use kernel::id::UserId;

use crate::domain::entitlement::QuotaStatus;
use crate::domain::value_objects::UsageKind;
use crate::error::BillingResult;

#[trait_variant::make(QuotaGate: Send)]
pub trait LocalQuotaGate {
    /// Current status of `kind`; `BillingError::QuotaExceeded` when no unit
    /// is left. Records nothing.
    async fn check(&self, user_id: &UserId, kind: UsageKind) -> BillingResult<QuotaStatus>;

    /// Record one unit of `kind` if the quota allows it; otherwise
    /// `BillingError::QuotaExceeded`.
    async fn consume(
        &self,
        user_id: &UserId,
        kind: UsageKind,
        agent: Option<&str>,
    ) -> BillingResult<QuotaStatus>;
}
