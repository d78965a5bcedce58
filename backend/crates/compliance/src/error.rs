//! Compliance Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::{DsarKind, DsarStatus};

pub type ComplianceResult<T> = Result<T, ComplianceError>;

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("Data request not found")]
    RequestNotFound,

    #[error("You already have an open {0} request")]
    OpenRequestExists(DsarKind),

    #[error("Request is {from} and cannot become {to}")]
    InvalidTransition { from: DsarStatus, to: DsarStatus },

    #[error("{0}")]
    Validation(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComplianceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComplianceError::RequestNotFound => ErrorKind::NotFound,
            ComplianceError::OpenRequestExists(_) | ComplianceError::InvalidTransition { .. } => {
                ErrorKind::Conflict
            }
            ComplianceError::Validation(_) => ErrorKind::BadRequest,
            ComplianceError::Forbidden => ErrorKind::Forbidden,
            ComplianceError::Database(_) | ComplianceError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            ComplianceError::OpenRequestExists(_) => {
                err.with_action("Wait for the open request to be completed")
            }
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            ComplianceError::Database(e) => {
                tracing::error!(error = %e, "Compliance database error");
            }
            ComplianceError::Internal(msg) => {
                tracing::error!(message = %msg, "Compliance internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Compliance request rejected");
            }
        }
    }
}

impl IntoResponse for ComplianceError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::csv::CsvExportError> for ComplianceError {
    fn from(err: platform::csv::CsvExportError) -> Self {
        ComplianceError::Internal(err.to_string())
    }
}

impl From<AppError> for ComplianceError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => ComplianceError::Forbidden,
            _ => ComplianceError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ComplianceError::RequestNotFound.status_code(), 404);
        assert_eq!(ComplianceError::OpenRequestExists(DsarKind::Erasure).status_code(), 409);
        assert_eq!(
            ComplianceError::InvalidTransition {
                from: DsarStatus::Completed,
                to: DsarStatus::InProgress
            }
            .status_code(),
            409
        );
        assert!(
            ComplianceError::OpenRequestExists(DsarKind::Access)
                .to_app_error()
                .action()
                .is_some()
        );
    }
}
