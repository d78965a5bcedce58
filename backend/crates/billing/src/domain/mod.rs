//! Domain Layer

pub mod entities;
pub mod entitlement;
pub mod events;
pub mod filter;
pub mod ports;
pub mod pricing;
pub mod repository;
pub mod value_objects;

pub use entities::{Purchase, UsageLog};
pub use entitlement::{Entitlement, QuotaStatus};
pub use events::{PaymentEvent, PaymentEventKind};
pub use filter::{PurchaseExportFilter, PurchaseExportQuery};
pub use ports::QuotaGate;
pub use pricing::{PRICING, PlanSpec, plan};
pub use repository::{AccountContact, AccountDirectory, PurchaseRepository, UsageRepository};
pub use value_objects::{PaymentProvider, PurchaseStatus, Tier, UsageKind};
