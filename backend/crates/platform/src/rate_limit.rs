//! Rate Limiting Infrastructure
//!
//! GCRA limits keyed by client IP (via `governor`), one store per limited
//! route group, and an axum middleware that answers 429 with `Retry-After`
//! and the usual error envelope.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use kernel::error::app_error::AppError;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::client::request_client_ip;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
#[error("Rate limit needs at least one request per non-empty window")]
pub struct InvalidRateLimit;

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// `max_requests` may burst at once; capacity refills evenly over the window.
    pub fn quota(&self) -> Result<Quota, InvalidRateLimit> {
        let burst = NonZeroU32::new(self.max_requests).ok_or(InvalidRateLimit)?;
        let quota = Quota::with_period(self.window / burst.get()).ok_or(InvalidRateLimit)?;
        Ok(quota.allow_burst(burst))
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Zero when allowed
    pub retry_after: Duration,
}

impl RateLimitResult {
    /// Whole seconds until the next request would be accepted, at least 1.
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_millis().div_ceil(1000).max(1) as u64
    }
}

pub type RateLimitStoreError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count this request and report whether it is within the limit.
    async fn check_and_increment(&self, key: &str) -> Result<RateLimitResult, RateLimitStoreError>;
}

type KeyedLimiter =
    RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock, StateInformationMiddleware>;

/// Single-process store backed by a keyed `governor` limiter.
pub struct MemoryRateLimitStore {
    limiter: KeyedLimiter,
    clock: DefaultClock,
}

impl MemoryRateLimitStore {
    pub fn new(config: &RateLimitConfig) -> Result<Self, InvalidRateLimit> {
        let limiter = RateLimiter::keyed(config.quota()?).with_middleware::<StateInformationMiddleware>();
        Ok(Self {
            limiter,
            clock: DefaultClock::default(),
        })
    }

    pub fn check(&self, key: &str) -> RateLimitResult {
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => RateLimitResult {
                allowed: true,
                remaining: snapshot.remaining_burst_capacity(),
                retry_after: Duration::ZERO,
            },
            Err(not_until) => RateLimitResult {
                allowed: false,
                remaining: 0,
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    /// Forget keys whose capacity has fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(&self, key: &str) -> Result<RateLimitResult, RateLimitStoreError> {
        Ok(self.check(key))
    }
}

/// Periodically prune the given stores until the runtime shuts down.
pub fn spawn_pruner(stores: Vec<Arc<MemoryRateLimitStore>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for store in &stores {
                store.prune();
            }
            tracing::debug!(
                keys = stores.iter().map(|s| s.tracked_keys()).sum::<usize>(),
                "Pruned rate limit state"
            );
        }
    })
}

/// Middleware state
pub struct RateLimitState<S>
where
    S: RateLimitStore + Sync + 'static,
{
    pub store: Arc<S>,
    /// Route group name, used in logs
    pub scope: &'static str,
}

impl<S> Clone for RateLimitState<S>
where
    S: RateLimitStore + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scope: self.scope,
        }
    }
}

impl<S> RateLimitState<S>
where
    S: RateLimitStore + Sync + 'static,
{
    pub fn new(store: Arc<S>, scope: &'static str) -> Self {
        Self { store, scope }
    }
}

/// Use with `axum::middleware::from_fn_with_state`.
pub async fn rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Sync + 'static,
{
    let client = request_client_ip(&req)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let result = match state.store.check_and_increment(&client).await {
        Ok(result) => result,
        Err(e) => {
            // Store failures fail open.
            tracing::error!(error = %e, scope = state.scope, "Rate limit store error");
            return next.run(req).await;
        }
    };

    if !result.allowed {
        let retry_after = result.retry_after_secs();
        tracing::warn!(
            client = %client,
            scope = state.scope,
            retry_after_secs = retry_after,
            "Rate limit exceeded"
        );
        let mut response = AppError::too_many_requests("Too many requests")
            .with_action("Wait a moment and try again")
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&result.remaining.to_string()) {
        response.headers_mut().insert("x-ratelimit-remaining", value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_burst_then_block() {
        let store = MemoryRateLimitStore::new(&RateLimitConfig::new(2, 60)).unwrap();

        let first = store.check("k");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert!(store.check("k").allowed);

        let third = store.check("k");
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        // One request refills every 30 s
        assert!(third.retry_after <= Duration::from_secs(30));
        assert!((1..=30).contains(&third.retry_after_secs()));

        // Other keys are independent
        assert!(store.check("other").allowed);
        assert_eq!(store.tracked_keys(), 2);
    }

    #[test]
    fn test_zero_requests_rejected() {
        assert!(MemoryRateLimitStore::new(&RateLimitConfig::new(0, 60)).is_err());
        assert!(MemoryRateLimitStore::new(&RateLimitConfig::new(10, 0)).is_err());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let result = RateLimitResult {
            allowed: false,
            remaining: 0,
            retry_after: Duration::from_millis(1_200),
        };
        assert_eq!(result.retry_after_secs(), 2);

        let instant = RateLimitResult {
            retry_after: Duration::ZERO,
            ..result
        };
        assert_eq!(instant.retry_after_secs(), 1);
    }

    #[tokio::test]
    async fn test_middleware_returns_429() {
        let store = Arc::new(MemoryRateLimitStore::new(&RateLimitConfig::new(1, 60)).unwrap());
        let state = RateLimitState::new(store, "test");
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                rate_limit::<MemoryRateLimitStore>,
            ));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()["x-ratelimit-remaining"], "0");

        let limited = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key(header::RETRY_AFTER));
    }
}
