//! Infrastructure Layer

pub mod postgres;
pub mod storage;

pub use postgres::PgUgcRepository;
pub use storage::DiskMediaStorage;
