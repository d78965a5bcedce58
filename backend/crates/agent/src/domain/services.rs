//! Domain Services
//!
//! Pure rules for metadata limits, toggle fallback and drift detection.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::domain::entities::AgentToggle;
use crate::domain::value_objects::{AgentKind, Confidence};
use crate::error::{AgentError, AgentResult};

pub const MAX_METADATA_KEYS: usize = 32;
pub const MAX_METADATA_BYTES: usize = 8 * 1024;
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Scores considered by the rolling mean
pub const DRIFT_WINDOW: usize = 5;
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.55;

/// Merge `patch` into `current`. A `null` value removes the key.
pub fn merge_metadata(current: &Map<String, Value>, patch: Value) -> AgentResult<Map<String, Value>> {
    let Value::Object(patch) = patch else {
        return Err(AgentError::InvalidMetadata("Metadata must be a JSON object".into()));
    };

    let mut merged = current.clone();
    for (key, value) in patch {
        if key.trim().is_empty() {
            return Err(AgentError::InvalidMetadata("Metadata keys cannot be empty".into()));
        }
        if value.is_null() {
            merged.remove(&key);
        } else {
            merged.insert(key, value);
        }
    }

    validate_metadata(&merged)?;
    Ok(merged)
}

pub fn validate_metadata(metadata: &Map<String, Value>) -> AgentResult<()> {
    if metadata.len() > MAX_METADATA_KEYS {
        return Err(AgentError::InvalidMetadata(format!(
            "Metadata is limited to {} keys",
            MAX_METADATA_KEYS
        )));
    }
    let size = serde_json::to_vec(metadata)
        .map_err(|e| AgentError::Internal(e.to_string()))?
        .len();
    if size > MAX_METADATA_BYTES {
        return Err(AgentError::InvalidMetadata(format!(
            "Metadata is limited to {} bytes",
            MAX_METADATA_BYTES
        )));
    }
    Ok(())
}

/// Trimmed chat message, 1..=4000 characters
pub fn parse_message(raw: &str) -> AgentResult<String> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(AgentError::Validation("Message cannot be empty".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AgentError::Validation(format!(
            "Message is limited to {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(message.to_string())
}

/// Enabled state of every agent
#[derive(Debug, Clone, Default)]
pub struct ToggleSet {
    states: HashMap<AgentKind, bool>,
}

impl ToggleSet {
    pub fn from_toggles(toggles: &[AgentToggle]) -> Self {
        Self {
            states: toggles.iter().map(|t| (t.agent, t.enabled)).collect(),
        }
    }

    pub fn is_enabled(&self, agent: AgentKind) -> bool {
        self.states.get(&agent).copied().unwrap_or(true)
    }

    /// `preferred` when enabled, else the first enabled agent with the
    /// default agent tried first.
    pub fn first_enabled(&self, preferred: AgentKind) -> Option<AgentKind> {
        if self.is_enabled(preferred) {
            return Some(preferred);
        }
        std::iter::once(AgentKind::DEFAULT)
            .chain(AgentKind::ALL)
            .find(|agent| self.is_enabled(*agent))
    }
}

/// Rolling mean of the latest `window` scores, when a full window sits
/// below `threshold`.
pub fn low_confidence_mean(recent: &[Confidence], window: usize, threshold: f64) -> Option<f64> {
    if window == 0 || recent.len() < window {
        return None;
    }
    let mean = recent[..window].iter().map(Confidence::value).sum::<f64>() / window as f64;
    (mean < threshold).then_some(mean)
}
