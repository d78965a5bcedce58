//! Payment webhook signature verification
//!
//! The provider signs every delivery with its private key and sends a
//! compact JWS in a header. Claims carry the issue time and the SHA-256 of
//! the raw request body:
//!
//! ```json
//! { "iat": 1760000000, "request_body_sha256": "9f86d0..." }
//! ```
//!
//! A delivery is accepted only when the signature verifies against the
//! provider public key, the token is fresh, and the body hash matches.

use std::collections::HashSet;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{constant_time_eq, sha256_hex};

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Allowed clock skew for tokens issued "in the future".
const FUTURE_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid webhook public key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[error("Malformed signature: {0}")]
    Malformed(jsonwebtoken::errors::Error),

    #[error("Unexpected signature algorithm {0:?}")]
    AlgorithmMismatch(Algorithm),

    #[error("Signature verification failed")]
    BadSignature(jsonwebtoken::errors::Error),

    #[error("Signature is too old or issued in the future")]
    Stale,

    #[error("Body hash does not match signature")]
    BodyMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookClaims {
    pub iat: i64,
    pub request_body_sha256: String,
}

pub struct WebhookVerifier {
    key: DecodingKey,
    algorithm: Algorithm,
    max_age: Duration,
}

impl WebhookVerifier {
    /// P-256 public key (SPKI PEM), ES256 signatures.
    pub fn from_ec_pem(pem: &[u8]) -> Result<Self, WebhookError> {
        let key = DecodingKey::from_ec_pem(pem).map_err(WebhookError::InvalidKey)?;
        Ok(Self::new(key, Algorithm::ES256))
    }

    /// RSA public key (PEM), RS256 signatures.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, WebhookError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(WebhookError::InvalidKey)?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    /// Try EC first, then RSA.
    pub fn from_pem(pem: &[u8]) -> Result<Self, WebhookError> {
        Self::from_ec_pem(pem).or_else(|_| Self::from_rsa_pem(pem))
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self {
            key,
            algorithm,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn verify(&self, token: &str, body: &[u8]) -> Result<WebhookClaims, WebhookError> {
        self.verify_at(token, body, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        token: &str,
        body: &[u8],
        now: i64,
    ) -> Result<WebhookClaims, WebhookError> {
        let token = token.trim();
        let header = decode_header(token).map_err(WebhookError::Malformed)?;
        if header.alg != self.algorithm {
            return Err(WebhookError::AlgorithmMismatch(header.alg));
        }

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let claims = decode::<WebhookClaims>(token, &self.key, &validation)
            .map_err(WebhookError::BadSignature)?
            .claims;

        let age = now - claims.iat;
        if age > self.max_age.as_secs() as i64 || age < -FUTURE_SKEW_SECS {
            return Err(WebhookError::Stale);
        }

        let expected = sha256_hex(body);
        let provided = claims.request_body_sha256.to_ascii_lowercase();
        if !constant_time_eq(expected.as_bytes(), provided.as_bytes()) {
            return Err(WebhookError::BodyMismatch);
        }

        Ok(claims)
    }
}


#[cfg(test)]
mod tests {
    use super::test_keys::*;
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const NOW: i64 = 1_760_000_000;

    fn sign(body: &[u8], iat: i64) -> String {
        let claims = WebhookClaims {
            iat,
            request_body_sha256: sha256_hex(body),
        };
        let key = EncodingKey::from_ec_pem(EC_PRIVATE_PEM.as_bytes()).unwrap();
        encode(&Header::new(Algorithm::ES256), &claims, &key).unwrap()
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::from_pem(EC_PUBLIC_PEM.as_bytes()).unwrap()
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"type":"payment.completed"}"#;
        let claims = verifier().verify_at(&sign(body, NOW), body, NOW + 10).unwrap();
        assert_eq!(claims.iat, NOW);
        assert_eq!(verifier().algorithm(), Algorithm::ES256);
    }

    #[test]
    fn test_tampered_body_rejected() {
        let token = sign(b"{\"amount\":2900}", NOW);
        let err = verifier()
            .verify_at(&token, b"{\"amount\":1}", NOW)
            .unwrap_err();
        assert!(matches!(err, WebhookError::BodyMismatch));
    }

    #[test]
    fn test_stale_and_future_tokens_rejected() {
        let body = b"{}";
        let v = verifier();
        assert!(matches!(
            v.verify_at(&sign(body, NOW - 301), body, NOW),
            Err(WebhookError::Stale)
        ));
        assert!(matches!(
            v.verify_at(&sign(body, NOW + 120), body, NOW),
            Err(WebhookError::Stale)
        ));
        assert!(v.verify_at(&sign(body, NOW - 299), body, NOW).is_ok());
    }

    #[test]
    fn test_wrong_algorithm_and_garbage() {
        let claims = WebhookClaims {
            iat: NOW,
            request_body_sha256: sha256_hex(b"{}"),
        };
        let hs = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"guess"),
        )
        .unwrap();
        assert!(matches!(
            verifier().verify_at(&hs, b"{}", NOW),
            Err(WebhookError::AlgorithmMismatch(Algorithm::HS256))
        ));

        assert!(matches!(
            verifier().verify_at("not.a.jws", b"{}", NOW),
            Err(WebhookError::Malformed(_))
        ));
        assert!(WebhookVerifier::from_pem(b"nope").is_err());
    }
}
