//! Assistant backends
//!
//! [`HttpAssistantClient`] talks to an OpenAI-compatible chat-completions
//! endpoint. [`CannedAssistantClient`] answers locally and is used when no
//! endpoint is configured.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::domain::catalog::{localized, profile};
use crate::domain::ports::{AssistantClient, AssistantReply, AssistantRequest};
use crate::domain::value_objects::Confidence;
use crate::error::{AgentError, AgentResult};

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl AssistantConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 800,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

pub struct HttpAssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl HttpAssistantClient {
    pub fn new(config: AssistantConfig) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }
}

/// Chat-completions carry no confidence; derive one from how the reply ended.
pub fn estimate_confidence(finish_reason: Option<&str>, content: &str) -> Confidence {
    if content.trim().is_empty() {
        return Confidence::new(0.0);
    }
    let base = match finish_reason {
        Some("stop") => 0.9,
        Some("length") => 0.5,
        Some("content_filter") => 0.2,
        _ => 0.6,
    };
    // Very short answers are usually refusals or clarifying questions
    let penalty = if content.chars().count() < 40 { 0.2 } else { 0.0 };
    Confidence::new(base - penalty)
}

impl AssistantClient for HttpAssistantClient {
    async fn complete(&self, request: &AssistantRequest) -> AgentResult<AssistantReply> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.message },
            ],
        });

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Assistant(format!("upstream returned {}: {}", status, body)));
        }

        let completion: CompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Assistant("upstream returned no choices".into()))?;
        let content = choice.message.content.unwrap_or_default();
        let confidence = estimate_confidence(choice.finish_reason.as_deref(), &content);

        tracing::debug!(
            agent = %request.agent,
            language = %request.language,
            confidence = confidence.value(),
            "Assistant replied"
        );

        Ok(AssistantReply {
            content,
            confidence,
        })
    }
}

/// Local stand-in that greets in the served language and echoes the topic.
#[derive(Debug, Clone)]
pub struct CannedAssistantClient {
    confidence: Confidence,
}

impl Default for CannedAssistantClient {
    fn default() -> Self {
        Self::with_confidence(0.8)
    }
}

impl CannedAssistantClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence(confidence: f64) -> Self {
        Self {
            confidence: Confidence::new(confidence),
        }
    }
}

impl AssistantClient for CannedAssistantClient {
    async fn complete(&self, request: &AssistantRequest) -> AgentResult<AssistantReply> {
        let prompt = localized(request.agent, request.language);
        let topic: String = request.message.chars().take(120).collect();
        Ok(AssistantReply {
            content: format!(
                "{} ({}) [{}]: {}",
                prompt.greeting,
                profile(request.agent).title,
                prompt.language.code(),
                topic
            ),
            confidence: self.confidence,
        })
    }
}

/// The assistant chosen at startup
pub enum AppAssistant {
    Http(HttpAssistantClient),
    Canned(CannedAssistantClient),
}

impl AssistantClient for AppAssistant {
    async fn complete(&self, request: &AssistantRequest) -> AgentResult<AssistantReply> {
        match self {
            AppAssistant::Http(client) => client.complete(request).await,
            AppAssistant::Canned(client) => client.complete(request).await,
        }
    }
}
