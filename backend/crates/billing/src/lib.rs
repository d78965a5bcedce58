//! Billing
//!
//! - Pricing table for the free, starter, official and family tiers
//! - Checkout, purchase history and admin CSV export
//! - Signed payment-provider webhooks moving purchases between states
//! - Entitlement resolution and quota metering ([`QuotaGate`])

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::{AccessControlUseCase, BillingConfig};
pub use domain::{Entitlement, QuotaGate, QuotaStatus, Tier, UsageKind};
pub use error::{BillingError, BillingResult};
pub use infra::PgBillingRepository;
pub use presentation::billing_router;
