//! Infrastructure Layer

pub mod postgres;

pub use postgres::PgComplianceRepository;
