pub mod audit_log;
pub mod audit_writer;
pub mod config;
pub mod manage_dsar;
pub mod my_data;
pub mod submit_dsar;

pub use audit_log::AuditLogUseCase;
pub use audit_writer::{run_audit_writer, spawn_audit_writer};
pub use config::ComplianceConfig;
pub use manage_dsar::{DsarUpdate, ManageDsarUseCase, UpdateDsarInput};
pub use my_data::MyDataUseCase;
pub use submit_dsar::{SubmitDsarInput, SubmitDsarUseCase};
