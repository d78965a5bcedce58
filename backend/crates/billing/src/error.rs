//! Billing Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::webhook::WebhookError;
use thiserror::Error;

use crate::domain::value_objects::{PurchaseStatus, Tier, UsageKind};

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Purchase not found")]
    PurchaseNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Your {tier} plan has no {kind} quota left")]
    QuotaExceeded { kind: UsageKind, tier: Tier },

    #[error("Webhook signature rejected: {0}")]
    InvalidSignature(#[from] WebhookError),

    #[error("Missing webhook signature")]
    MissingSignature,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Paid amount {paid} {currency} does not match the {tier} price")]
    AmountMismatch {
        tier: Tier,
        paid: i64,
        currency: String,
    },

    #[error("Purchase is {from} and cannot become {to}")]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::PurchaseNotFound => ErrorKind::NotFound,
            BillingError::Validation(_)
            | BillingError::InvalidPayload(_)
            | BillingError::AmountMismatch { .. } => ErrorKind::BadRequest,
            BillingError::QuotaExceeded { .. } => ErrorKind::PaymentRequired,
            BillingError::InvalidSignature(_) | BillingError::MissingSignature => {
                ErrorKind::Unauthorized
            }
            BillingError::InvalidTransition { .. } => ErrorKind::Conflict,
            BillingError::Forbidden => ErrorKind::Forbidden,
            BillingError::Database(_) | BillingError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            BillingError::QuotaExceeded { .. } => {
                AppError::new(self.kind(), self.to_string()).with_action("Upgrade your plan to continue")
            }
            // Providers get no detail on why a signature failed
            BillingError::InvalidSignature(_) => {
                AppError::new(self.kind(), "Webhook signature rejected")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            BillingError::Database(e) => {
                tracing::error!(error = %e, "Billing database error");
            }
            BillingError::Internal(msg) => {
                tracing::error!(message = %msg, "Billing internal error");
            }
            BillingError::InvalidSignature(e) => {
                tracing::warn!(reason = %e, "Webhook signature rejected");
            }
            BillingError::MissingSignature | BillingError::AmountMismatch { .. } => {
                tracing::warn!(error = %self, "Suspicious webhook delivery");
            }
            _ => {
                tracing::debug!(error = %self, "Billing request rejected");
            }
        }
    }
}

impl IntoResponse for BillingError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::csv::CsvExportError> for BillingError {
    fn from(err: platform::csv::CsvExportError) -> Self {
        BillingError::Internal(err.to_string())
    }
}

impl From<AppError> for BillingError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => BillingError::Forbidden,
            _ => BillingError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let quota = BillingError::QuotaExceeded {
            kind: UsageKind::AiPrompt,
            tier: Tier::Free,
        };
        assert_eq!(quota.status_code(), 402);
        assert!(quota.to_app_error().action().is_some());
        assert_eq!(BillingError::MissingSignature.status_code(), 401);
        assert_eq!(
            BillingError::InvalidTransition {
                from: PurchaseStatus::Refunded,
                to: PurchaseStatus::Completed
            }
            .status_code(),
            409
        );
    }

    #[test]
    fn test_signature_detail_hidden() {
        let err = BillingError::InvalidSignature(WebhookError::Stale);
        assert_eq!(err.to_app_error().message(), "Webhook signature rejected");
    }
}
