//! Outbound email
//!
//! Transactional mail goes through SendGrid dynamic templates. Each
//! [`EmailTemplate`] maps to a configured template id; without one the
//! message is sent as plain text using the fallback subject.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    Welcome,
    StoryReceived,
    StoryPublished,
    StoryRejected,
    ModerationAlert,
    PurchaseReceipt,
    DsarReceived,
    DsarCompleted,
}

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 8] = [
        EmailTemplate::Welcome,
        EmailTemplate::StoryReceived,
        EmailTemplate::StoryPublished,
        EmailTemplate::StoryRejected,
        EmailTemplate::ModerationAlert,
        EmailTemplate::PurchaseReceipt,
        EmailTemplate::DsarReceived,
        EmailTemplate::DsarCompleted,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "welcome",
            EmailTemplate::StoryReceived => "story_received",
            EmailTemplate::StoryPublished => "story_published",
            EmailTemplate::StoryRejected => "story_rejected",
            EmailTemplate::ModerationAlert => "moderation_alert",
            EmailTemplate::PurchaseReceipt => "purchase_receipt",
            EmailTemplate::DsarReceived => "dsar_received",
            EmailTemplate::DsarCompleted => "dsar_completed",
        }
    }

    pub const fn fallback_subject(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "Welcome aboard",
            EmailTemplate::StoryReceived => "We received your story",
            EmailTemplate::StoryPublished => "Your story is live",
            EmailTemplate::StoryRejected => "About your story submission",
            EmailTemplate::ModerationAlert => "Moderation alert: content needs review",
            EmailTemplate::PurchaseReceipt => "Your purchase receipt",
            EmailTemplate::DsarReceived => "We received your data request",
            EmailTemplate::DsarCompleted => "Your data request is complete",
        }
    }

    /// Env var holding the SendGrid template id, e.g. `SENDGRID_TEMPLATE_STORY_RECEIVED`.
    pub fn env_key(&self) -> String {
        format!("SENDGRID_TEMPLATE_{}", self.code().to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub template: EmailTemplate,
    /// Language code passed to the template
    pub language: String,
    pub data: serde_json::Value,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, template: EmailTemplate, language: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            template,
            language: language.into(),
            data: json!({}),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid recipient address")]
    InvalidRecipient,
}

#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub template_ids: HashMap<EmailTemplate, String>,
    pub timeout: Duration,
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            from_name: "Immigration Assistant".to_string(),
            template_ids: HashMap::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Pick up `SENDGRID_TEMPLATE_*` ids from the environment.
    pub fn with_templates_from_env(mut self) -> Self {
        for template in EmailTemplate::ALL {
            if let Ok(id) = std::env::var(template.env_key()) {
                self.template_ids.insert(template, id);
            }
        }
        self
    }
}

pub struct SendGridMailer {
    http: reqwest::Client,
    config: SendGridConfig,
}

impl SendGridMailer {
    pub fn new(config: SendGridConfig) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        let mut data = message.data.clone();
        if let Some(map) = data.as_object_mut() {
            map.insert("lang".into(), json!(message.language));
            map.insert("subject".into(), json!(message.template.fallback_subject()));
        }

        let mut body = json!({
            "personalizations": [{
                "to": [{ "email": message.to }],
                "dynamic_template_data": data,
            }],
            "from": { "email": self.config.from_email, "name": self.config.from_name },
            "categories": [message.template.code()],
        });

        match self.config.template_ids.get(&message.template) {
            Some(template_id) => {
                body["template_id"] = json!(template_id);
            }
            None => {
                body["subject"] = json!(message.template.fallback_subject());
                body["content"] = json!([{
                    "type": "text/plain",
                    "value": render_plain_text(message),
                }]);
            }
        }
        body
    }
}

impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        if !message.to.contains('@') {
            return Err(MailerError::InvalidRecipient);
        }

        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(template = message.template.code(), "Email sent");
        Ok(())
    }
}

/// Development mailer: logs instead of sending and keeps what it "sent".
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        if !message.to.contains('@') {
            return Err(MailerError::InvalidRecipient);
        }
        tracing::info!(
            to = %message.to,
            template = message.template.code(),
            lang = %message.language,
            "Email (log only)"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// The mailer chosen at startup
pub enum AppMailer {
    SendGrid(SendGridMailer),
    Log(LogMailer),
}

impl Mailer for AppMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        match self {
            AppMailer::SendGrid(m) => Mailer::send(m, message).await,
            AppMailer::Log(m) => Mailer::send(m, message).await,
        }
    }
}

fn render_plain_text(message: &EmailMessage) -> String {
    let mut lines = vec![message.template.fallback_subject().to_string(), String::new()];
    if let Some(map) = message.data.as_object() {
        for (key, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("{}: {}", key.replace('_', " "), value));
        }
    }
    lines.join("\n")
}
