//! Moderation Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type ModerationResult<T> = Result<T, ModerationError>;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Flag not found")]
    FlagNotFound,

    #[error("Flag has already been reviewed")]
    AlreadyReviewed,

    #[error("{0}")]
    InvalidFilter(String),

    #[error("{0}")]
    Validation(String),

    #[error("Moderator role required")]
    Forbidden,

    #[error("Invalid filter rule {0}")]
    InvalidRule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModerationError::FlagNotFound => ErrorKind::NotFound,
            ModerationError::AlreadyReviewed => ErrorKind::Conflict,
            ModerationError::InvalidFilter(_) | ModerationError::Validation(_) => {
                ErrorKind::BadRequest
            }
            ModerationError::Forbidden => ErrorKind::Forbidden,
            ModerationError::InvalidRule(_)
            | ModerationError::Database(_)
            | ModerationError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            ModerationError::Database(e) => {
                tracing::error!(error = %e, "Moderation database error");
            }
            ModerationError::InvalidRule(msg) | ModerationError::Internal(msg) => {
                tracing::error!(message = %msg, "Moderation internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Moderation request rejected");
            }
        }
    }
}

impl IntoResponse for ModerationError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for ModerationError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => ModerationError::Forbidden,
            _ => ModerationError::Internal(err.to_string()),
        }
    }
}
