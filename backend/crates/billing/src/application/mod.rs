//! Application Layer

pub mod access_control;
pub mod checkout;
pub mod config;
pub mod handle_webhook;
pub mod purchases;

pub use access_control::AccessControlUseCase;
pub use checkout::{CheckoutInput, CheckoutUseCase};
pub use config::BillingConfig;
pub use handle_webhook::{HandleWebhookUseCase, WebhookOutcome};
pub use purchases::PurchasesUseCase;
