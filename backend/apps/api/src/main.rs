//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::sync::Arc;
use std::time::Duration;

use agent::{
    AgentConfig, AppAssistant, AssistantConfig, CannedAssistantClient, HttpAssistantClient,
    PgAgentRepository, agent_router,
};
use anyhow::Context;
use auth::{PgAuthRepository, SessionResolver, TokenService, attach_auth_context, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
    routing::get,
};
use billing::{AccessControlUseCase, BillingConfig, PgBillingRepository, billing_router};
use compliance::{ComplianceConfig, PgComplianceRepository, compliance_router, spawn_audit_writer};
use kernel::ApiResponse;
use kernel::audit::{AUDIT_CHANNEL_CAPACITY, AuditHandle};
use moderation::{
    AlertNotifier, ContentFilter, ModerationConfig, PgFlagRepository, ScreenContentUseCase,
    moderation_router,
};
use platform::mailer::{AppMailer, LogMailer, SendGridConfig, SendGridMailer};
use platform::rate_limit::{MemoryRateLimitStore, RateLimitState, rate_limit, spawn_pruner};
use platform::webhook::WebhookVerifier;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ugc::{DiskMediaStorage, PgUgcRepository, UgcConfig, stories_router, ugc_router};

use crate::config::AppSettings;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,moderation=info,ugc=info,billing=info,agent=info,compliance=info,platform=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = AppSettings::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Audit trail: every crate records through the handle, one task writes
    let compliance_repo = Arc::new(PgComplianceRepository::new(pool.clone()));
    let compliance_config = if cfg!(debug_assertions) {
        ComplianceConfig::development()
    } else {
        ComplianceConfig::default()
    };
    let (audit, audit_rx) = AuditHandle::channel(AUDIT_CHANNEL_CAPACITY);
    let audit_writer = spawn_audit_writer(compliance_repo.clone(), audit_rx, compliance_config);

    // Outbound integrations
    let mailer = Arc::new(match &settings.sendgrid {
        Some(sg) => AppMailer::SendGrid(SendGridMailer::new(
            SendGridConfig::new(&sg.api_key, &sg.from_email).with_templates_from_env(),
        )?),
        None => {
            tracing::warn!("SENDGRID_API_KEY not set, emails are only logged");
            AppMailer::Log(LogMailer::new())
        }
    });

    let assistant = Arc::new(match &settings.assistant {
        Some(a) => {
            let mut config = AssistantConfig::new(&a.api_url, &a.api_key);
            if let Some(model) = &a.model {
                config = config.with_model(model);
            }
            AppAssistant::Http(HttpAssistantClient::new(config)?)
        }
        None => {
            tracing::warn!("ASSISTANT_API_URL not set, agents reply with canned text");
            AppAssistant::Canned(CannedAssistantClient::new())
        }
    });

    // Auth
    let tokens = Arc::new(TokenService::new(&settings.auth));
    let auth_repo = PgAuthRepository::new(pool.clone());
    let sessions = Arc::new(SessionResolver::new(tokens.clone(), Arc::new(auth_repo.clone())));

    // Moderation
    let mut moderation_config = if cfg!(debug_assertions) {
        ModerationConfig::development()
    } else {
        ModerationConfig::default()
    };
    if let Some(list) = &settings.moderation_alert_recipients {
        moderation_config = moderation_config.with_recipients(list);
    }
    let flags = Arc::new(PgFlagRepository::new(pool.clone()));
    let filter = Arc::new(ContentFilter::with_default_rules()?);
    let notifier = Arc::new(AlertNotifier::new(mailer.clone(), Arc::new(moderation_config)));
    let screener = Arc::new(ScreenContentUseCase::new(flags.clone(), filter.clone(), notifier));

    // UGC
    let ugc_repo = Arc::new(PgUgcRepository::new(pool.clone()));
    let ugc_config = match &settings.media_root {
        Some(root) => UgcConfig::default().with_media_root(root),
        None => UgcConfig::development(),
    };
    let storage = Arc::new(DiskMediaStorage::new(ugc_config.media_root.clone()));
    let ugc_config = Arc::new(ugc_config);

    // Billing
    let billing_repo = Arc::new(PgBillingRepository::new(pool.clone()));
    let billing_config = BillingConfig::default();
    let verifier = Arc::new(
        WebhookVerifier::from_pem(settings.webhook_public_key.as_bytes())
            .context("PAYMENT_WEBHOOK_PUBLIC_KEY is not a valid EC or RSA public key")?
            .with_max_age(billing_config.webhook_max_age),
    );
    let quota = Arc::new(AccessControlUseCase::new(billing_repo.clone()));

    // Agents
    let agent_repo = Arc::new(PgAgentRepository::new(pool.clone()));

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = settings
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Rate limiting
    let api_store = Arc::new(MemoryRateLimitStore::new(&settings.rate_limit)?);
    let auth_store = Arc::new(MemoryRateLimitStore::new(&settings.auth_rate_limit)?);
    spawn_pruner(vec![api_store.clone(), auth_store.clone()], Duration::from_secs(300));
    let api_limit = RateLimitState::new(api_store, "api");
    let auth_limit = RateLimitState::new(auth_store, "auth");

    // Build router
    let app = Router::new()
        .route("/api/health", get(health))
        .nest(
            "/api/auth",
            auth_router(auth_repo, mailer.clone(), tokens.clone(), audit.clone(), settings.auth.clone())
                .layer(middleware::from_fn_with_state(auth_limit, rate_limit::<MemoryRateLimitStore>)),
        )
        .nest(
            "/api/moderation",
            moderation_router(flags, ugc_repo.clone(), filter, audit.clone()),
        )
        .nest(
            "/api/stories",
            stories_router(
                ugc_repo.clone(),
                screener.clone(),
                mailer.clone(),
                storage.clone(),
                audit.clone(),
                ugc_config.clone(),
            ),
        )
        .nest(
            "/api/ugc",
            ugc_router(ugc_repo, screener.clone(), mailer.clone(), storage, audit.clone(), ugc_config),
        )
        .nest(
            "/api/billing",
            billing_router(billing_repo, mailer.clone(), verifier, audit.clone(), billing_config),
        )
        .nest(
            "/api/agents",
            agent_router(agent_repo, screener, quota, assistant, audit.clone(), AgentConfig::default()),
        )
        .nest(
            "/api/compliance",
            compliance_router(compliance_repo, mailer, audit),
        )
        .layer(middleware::from_fn_with_state(sessions, attach_auth_context::<PgAuthRepository>))
        .layer(middleware::from_fn_with_state(api_limit, rate_limit::<MemoryRateLimitStore>))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = settings.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Routers held the last audit handles; let the writer flush
    if let Err(e) = audit_writer.await {
        tracing::warn!(error = %e, "Audit writer ended abnormally");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(json!({ "status": "ok" }))
}
