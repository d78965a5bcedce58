pub mod entities;
pub mod filter;
pub mod repository;
pub mod value_objects;

pub use entities::{AccessBundle, AuditLog, DsarRequest, ErasureReport};
pub use filter::{AuditFilter, AuditQuery, DsarFilter, DsarListQuery};
pub use repository::{AuditRepository, DataSubjectStore, DsarRepository, SubjectContact};
pub use value_objects::{DsarKind, DsarStatus, Regulation};
