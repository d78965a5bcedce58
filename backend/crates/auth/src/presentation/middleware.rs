//! Auth Middleware
//!
//! Turns a bearer token into an [`AuthContext`] in the request extensions.
//! Handlers in other crates pick it up with the `AuthContext` extractor.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::session::SessionResolver;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;

/// - No `Authorization` header: anonymous, request continues
/// - Valid `Bearer` token of a usable account: `AuthContext` with the
///   account's current role inserted
/// - Anything else: 401 (403 for disabled accounts)
pub async fn attach_auth_context<U>(
    State(sessions): State<Arc<SessionResolver<U>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
{
    let token = match bearer_token(&req) {
        Ok(Some(token)) => token,
        Ok(None) => return next.run(req).await,
        Err(e) => return e.into_response(),
    };

    match sessions.resolve(&token).await {
        Ok(ctx) => {
            tracing::debug!(user_id = %ctx.user_id, role = %ctx.role, "Request authenticated");
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

fn bearer_token<B>(req: &Request<B>) -> Result<Option<String>, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(Some(token.to_string()))
}
