//! Agent Error Types

use axum::response::{IntoResponse, Response};
use billing::BillingError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use moderation::ModerationError;
use thiserror::Error;

use crate::domain::value_objects::AgentKind;

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("agent unavailable")]
    AgentUnavailable(AgentKind),

    #[error("Agent context not found")]
    ContextNotFound,

    #[error("{0}")]
    InvalidMetadata(String),

    #[error("{0}")]
    Validation(String),

    #[error("Your message could not be sent because it violates our community guidelines")]
    MessageRejected,

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error("Assistant unavailable: {0}")]
    Assistant(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::UnknownAgent(_) | AgentError::ContextNotFound => ErrorKind::NotFound,
            AgentError::AgentUnavailable(_) | AgentError::Forbidden => ErrorKind::Forbidden,
            AgentError::InvalidMetadata(_) | AgentError::Validation(_) => ErrorKind::BadRequest,
            AgentError::MessageRejected => ErrorKind::UnprocessableEntity,
            AgentError::Billing(e) => e.kind(),
            AgentError::Moderation(e) => e.kind(),
            AgentError::Assistant(_) => ErrorKind::BadGateway,
            AgentError::Database(_) | AgentError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            AgentError::Billing(e) => e.to_app_error(),
            AgentError::MessageRejected => AppError::new(self.kind(), self.to_string())
                .with_action("Rephrase your message and try again"),
            // Upstream detail stays in the logs
            AgentError::Assistant(_) => {
                AppError::new(self.kind(), "The assistant is unavailable right now")
                    .with_action("Try again in a moment")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            AgentError::Database(e) => {
                tracing::error!(error = %e, "Agent database error");
            }
            AgentError::Internal(msg) => {
                tracing::error!(message = %msg, "Agent internal error");
            }
            AgentError::Assistant(msg) => {
                tracing::error!(message = %msg, "Assistant backend failure");
            }
            AgentError::Moderation(e) if e.status_code() >= 500 => {
                tracing::error!(error = %e, "Moderation failure during chat");
            }
            AgentError::AgentUnavailable(agent) => {
                tracing::info!(agent = %agent, "Request for disabled agent");
            }
            _ => {
                tracing::debug!(error = %self, "Agent request rejected");
            }
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AgentError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => AgentError::Forbidden,
            _ => AgentError::Internal(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Assistant(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AgentError::UnknownAgent("atlas".into()).status_code(), 404);
        assert_eq!(AgentError::AgentUnavailable(AgentKind::Lumo).status_code(), 403);
        assert_eq!(AgentError::MessageRejected.status_code(), 422);
        assert_eq!(AgentError::Assistant("timeout".into()).status_code(), 502);
        assert_eq!(
            AgentError::AgentUnavailable(AgentKind::Lumo).to_app_error().message(),
            "agent unavailable"
        );
    }

    #[test]
    fn test_quota_error_passes_through() {
        let err = AgentError::from(BillingError::QuotaExceeded {
            kind: billing::UsageKind::AiPrompt,
            tier: billing::Tier::Free,
        });
        assert_eq!(err.status_code(), 402);
        assert!(err.to_app_error().action().is_some());
    }
}
