//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::Language;
use kernel::id::{ConfidenceScoreId, DriftSignalId, UserId};
use serde_json::{Map, Value};

use crate::domain::value_objects::{AgentKind, Confidence, DriftKind};

/// Admin switch for one agent. Agents without a stored toggle are enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentToggle {
    pub agent: AgentKind,
    pub enabled: bool,
    pub updated_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user conversation state
#[derive(Debug, Clone, PartialEq)]
pub struct AgentContext {
    pub user_id: UserId,
    pub active_agent: AgentKind,
    pub language: Language,
    pub metadata: Map<String, Value>,
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentContext {
    /// What a user without stored state sees
    pub fn default_for(user_id: UserId, language: Language) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            active_agent: AgentKind::DEFAULT,
            language,
            metadata: Map::new(),
            last_interaction_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, agent: AgentKind) {
        let now = Utc::now();
        self.active_agent = agent;
        self.last_interaction_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceScore {
    pub score_id: ConfidenceScoreId,
    pub user_id: Option<UserId>,
    pub agent: AgentKind,
    pub language: Language,
    pub score: Confidence,
    pub created_at: DateTime<Utc>,
}

impl ConfidenceScore {
    pub fn new(user_id: UserId, agent: AgentKind, language: Language, score: Confidence) -> Self {
        Self {
            score_id: ConfidenceScoreId::new(),
            user_id: Some(user_id),
            agent,
            language,
            score,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftSignal {
    pub signal_id: DriftSignalId,
    pub agent: AgentKind,
    pub language: Language,
    pub kind: DriftKind,
    /// Rolling mean for `LowConfidence`, 0 otherwise
    pub value: f64,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl DriftSignal {
    pub fn new(agent: AgentKind, language: Language, kind: DriftKind, value: f64, details: Value) -> Self {
        Self {
            signal_id: DriftSignalId::new(),
            agent,
            language,
            kind,
            value,
            details,
            created_at: Utc::now(),
        }
    }
}
