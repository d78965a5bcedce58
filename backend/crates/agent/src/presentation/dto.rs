//! API DTOs

use billing::QuotaStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::ChatOutcome;
use crate::domain::entities::{AgentContext, AgentToggle, DriftSignal};

#[derive(Debug, Clone, Deserialize)]
pub struct PromptQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContextRequest {
    pub agent: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContextResponse {
    pub active_agent: &'static str,
    pub language: &'static str,
    pub metadata: Map<String, Value>,
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<AgentContext> for AgentContextResponse {
    fn from(c: AgentContext) -> Self {
        Self {
            active_agent: c.active_agent.code(),
            language: c.language.code(),
            metadata: c.metadata,
            last_interaction_at: c.last_interaction_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub agent: &'static str,
    pub language: &'static str,
    pub reply: String,
    pub confidence: f64,
    pub quota: QuotaStatus,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(o: ChatOutcome) -> Self {
        Self {
            agent: o.agent.code(),
            language: o.language.code(),
            reply: o.reply,
            confidence: o.confidence.value(),
            quota: o.quota,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub agent: &'static str,
    pub enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<AgentToggle> for ToggleResponse {
    fn from(t: AgentToggle) -> Self {
        Self {
            agent: t.agent.code(),
            enabled: t.enabled,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriftListQuery {
    pub agent: Option<String>,
    pub language: Option<String>,
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSignalResponse {
    pub id: String,
    pub agent: &'static str,
    pub language: &'static str,
    pub kind: &'static str,
    pub value: f64,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl From<DriftSignal> for DriftSignalResponse {
    fn from(s: DriftSignal) -> Self {
        Self {
            id: s.signal_id.to_string(),
            agent: s.agent.code(),
            language: s.language.code(),
            kind: s.kind.code(),
            value: s.value,
            details: s.details,
            created_at: s.created_at,
        }
    }
}
