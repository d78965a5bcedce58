//! Server Settings
//!
//! Everything the binary reads from the environment, resolved once at
//! startup. Debug builds fill in development defaults for secrets.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use auth::AuthConfig;
use platform::crypto::from_base64;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct SendGridSettings {
    pub api_key: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    /// PEM of the payment provider's signing key
    pub webhook_public_key: String,
    pub sendgrid: Option<SendGridSettings>,
    pub moderation_alert_recipients: Option<String>,
    pub assistant: Option<AssistantSettings>,
    pub media_root: Option<PathBuf>,
    pub rate_limit: RateLimitConfig,
    /// Stricter limit for sign-up and sign-in
    pub auth_rate_limit: RateLimitConfig,
}

impl AppSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let auth = match optional("AUTH_TOKEN_SECRET") {
            Some(secret_b64) => {
                let secret = from_base64(&secret_b64).context("AUTH_TOKEN_SECRET must be base64")?;
                if secret.len() != 32 {
                    bail!("AUTH_TOKEN_SECRET must decode to 32 bytes");
                }
                AuthConfig {
                    token_secret: secret,
                    password_pepper: optional("PASSWORD_PEPPER").map(String::into_bytes),
                    ..AuthConfig::default()
                }
            }
            None if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_TOKEN_SECRET not set, using a random development secret");
                AuthConfig::development()
            }
            None => bail!("AUTH_TOKEN_SECRET must be set in production"),
        };

        let webhook_public_key = optional("PAYMENT_WEBHOOK_PUBLIC_KEY")
            .map(|pem| pem.replace("\\n", "\n"))
            .context("PAYMENT_WEBHOOK_PUBLIC_KEY must be set")?;

        let sendgrid = optional("SENDGRID_API_KEY").map(|api_key| SendGridSettings {
            api_key,
            from_email: optional("SENDGRID_FROM_EMAIL")
                .unwrap_or_else(|| "no-reply@immigration-assistant.app".to_string()),
        });

        let assistant = optional("ASSISTANT_API_URL").map(|api_url| AssistantSettings {
            api_url,
            api_key: optional("ASSISTANT_API_KEY").unwrap_or_default(),
            model: optional("ASSISTANT_MODEL"),
        });

        Ok(Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            bind_addr,
            frontend_origins,
            auth,
            webhook_public_key,
            sendgrid,
            moderation_alert_recipients: optional("MODERATION_ALERT_RECIPIENTS"),
            assistant,
            media_root: optional("MEDIA_ROOT").map(PathBuf::from),
            rate_limit: RateLimitConfig::new(
                parse_or("RATE_LIMIT_MAX_REQUESTS", 120)?,
                parse_or("RATE_LIMIT_WINDOW_SECS", 60)?,
            ),
            auth_rate_limit: RateLimitConfig::new(parse_or("AUTH_RATE_LIMIT_MAX_REQUESTS", 20)?, 60),
        })
    }
}

/// Unset and blank are the same thing
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number", key)),
        None => Ok(default),
    }
}
