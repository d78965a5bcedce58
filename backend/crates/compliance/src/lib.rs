//! Compliance
//!
//! GDPR / CCPA tooling: data subject requests with statutory due dates,
//! personal data export and erasure, and the audit trail fed by every
//! other crate through `kernel::audit::AuditHandle`.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::{ComplianceConfig, spawn_audit_writer};
pub use error::{ComplianceError, ComplianceResult};
pub use infra::PgComplianceRepository;
pub use presentation::compliance_router;
