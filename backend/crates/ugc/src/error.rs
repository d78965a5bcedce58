//! UGC Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use moderation::ModerationError;
use platform::upload::UploadError;
use thiserror::Error;

pub type UgcResult<T> = Result<T, UgcError>;

#[derive(Debug, Error)]
pub enum UgcError {
    #[error("Story not found")]
    StoryNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("A category with this slug already exists")]
    CategoryExists,

    #[error("{0}")]
    Validation(String),

    /// Screening blocked the submission
    #[error("Your story could not be published because it violates our community guidelines")]
    ContentRejected,

    #[error("One or more media items do not exist or belong to someone else")]
    MediaNotOwned,

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UgcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UgcError::StoryNotFound | UgcError::CategoryNotFound => ErrorKind::NotFound,
            UgcError::CategoryExists => ErrorKind::Conflict,
            UgcError::Validation(_) | UgcError::MediaNotOwned => ErrorKind::BadRequest,
            UgcError::ContentRejected => ErrorKind::UnprocessableEntity,
            UgcError::Upload(e) => match e {
                UploadError::Empty => ErrorKind::BadRequest,
                UploadError::TooLarge { .. } => ErrorKind::PayloadTooLarge,
                UploadError::Unrecognized
                | UploadError::NotAllowed(_)
                | UploadError::ContentTypeMismatch { .. } => ErrorKind::UnsupportedMediaType,
            },
            UgcError::Forbidden => ErrorKind::Forbidden,
            UgcError::Moderation(e) => e.kind(),
            UgcError::Storage(_) | UgcError::Database(_) | UgcError::Internal(_) => {
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
            UgcError::ContentRejected => err.with_action("Review the community guidelines and edit your story"),
            UgcError::Upload(UploadError::TooLarge { .. }) => err.with_action("Upload a smaller file"),
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            UgcError::Database(e) => {
                tracing::error!(error = %e, "UGC database error");
            }
            UgcError::Storage(e) => {
                tracing::error!(error = %e, "Media storage error");
            }
            UgcError::Internal(msg) => {
                tracing::error!(message = %msg, "UGC internal error");
            }
            UgcError::Moderation(e) if e.status_code() >= 500 => {
                tracing::error!(error = %e, "Moderation failure during UGC request");
            }
            UgcError::ContentRejected => {
                tracing::info!("Story submission blocked by screening");
            }
            _ => {
                tracing::debug!(error = %self, "UGC request rejected");
            }
        }
    }
}

impl IntoResponse for UgcError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::csv::CsvExportError> for UgcError {
    fn from(err: platform::csv::CsvExportError) -> Self {
        UgcError::Internal(err.to_string())
    }
}

impl From<AppError> for UgcError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => UgcError::Forbidden,
            ErrorKind::BadRequest => UgcError::Validation(err.message().to_string()),
            _ => UgcError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_statuses() {
        assert_eq!(UgcError::Upload(UploadError::TooLarge { max: 1 }).status_code(), 413);
        assert_eq!(UgcError::Upload(UploadError::NotAllowed("video/mp4")).status_code(), 415);
        assert_eq!(UgcError::Upload(UploadError::Empty).status_code(), 400);
    }

    #[test]
    fn test_rejected_is_422() {
        assert_eq!(UgcError::ContentRejected.status_code(), 422);
        assert!(UgcError::ContentRejected.to_app_error().action().is_some());
    }
}
