//! Request extractors that fail with the error envelope
//!
//! Drop-in replacements for `axum::Json` and `axum::extract::Query` whose
//! rejections render as `{ success: false, message }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;

use crate::error::app_error::AppError;

#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                AppError::unsupported_media_type("Expected a JSON request body")
                    .with_action("Send the body with Content-Type: application/json")
            }
            StatusCode::PAYLOAD_TOO_LARGE => AppError::payload_too_large("Request body is too large"),
            _ => AppError::bad_request(format!("Invalid JSON body: {}", rejection.body_text())),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}
