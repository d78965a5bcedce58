//! Bearer Tokens
//!
//! HS256 JWTs carrying the caller's id, role and language. Verification is
//! stateless: whatever the token says becomes the request's `AuthContext`.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::{AuthContext, Language, UserRole};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub lang: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.token_issuer.as_str()]);
        validation.leeway = 30;

        Self {
            encoding: EncodingKey::from_secret(&config.token_secret),
            decoding: DecodingKey::from_secret(&config.token_secret),
            validation,
            issuer: config.token_issuer.clone(),
            ttl_secs: config.token_ttl_secs(),
        }
    }

    pub fn issue(&self, ctx: &AuthContext) -> AuthResult<IssuedToken> {
        self.issue_at(ctx, Utc::now().timestamp())
    }

    pub fn issue_at(&self, ctx: &AuthContext, now: i64) -> AuthResult<IssuedToken> {
        let claims = Claims {
            sub: ctx.user_id.to_string(),
            role: ctx.role.code().to_string(),
            lang: ctx.language.code().to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            iss: self.issuer.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AuthError::Internal("Token expiry out of range".into()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Decode and validate a bearer token into the caller's context.
    pub fn verify(&self, token: &str) -> AuthResult<AuthContext> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;
        let claims = data.claims;

        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let role = UserRole::from_code(&claims.role).ok_or(AuthError::InvalidToken)?;
        let language = Language::from_code_or_default(Some(&claims.lang));

        Ok(AuthContext::new(user_id, role, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::UserId;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::with_random_secret())
    }

    fn ctx() -> AuthContext {
        AuthContext::new(UserId::new(), UserRole::Moderator, Language::Uk)
    }

    #[test]
    fn test_issue_then_verify() {
        let svc = service();
        let ctx = ctx();
        let issued = svc.issue(&ctx).unwrap();
        assert!(issued.expires_at > Utc::now());

        assert_eq!(svc.verify(&issued.token).unwrap(), ctx);
    }

    #[test]
    fn test_expired_token() {
        let svc = service();
        let long_ago = Utc::now().timestamp() - 13 * 3600;
        let issued = svc.issue_at(&ctx(), long_ago).unwrap();
        assert!(matches!(svc.verify(&issued.token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_foreign_or_garbage_token() {
        let issued = service().issue(&ctx()).unwrap();
        assert!(matches!(
            service().verify(&issued.token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service().verify("abc.def.ghi"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let config = AuthConfig::with_random_secret();
        let other = AuthConfig {
            token_issuer: "someone-else".into(),
            ..config.clone()
        };
        let token = TokenService::new(&other).issue(&ctx()).unwrap().token;
        assert!(TokenService::new(&config).verify(&token).is_err());
    }
}
