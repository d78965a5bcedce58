//! Application Configuration

use crate::domain::services::{DRIFT_WINDOW, LOW_CONFIDENCE_THRESHOLD};

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Scores averaged for low-confidence drift
    pub drift_window: usize,
    /// Rolling mean below which drift is recorded
    pub low_confidence_threshold: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            drift_window: DRIFT_WINDOW,
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
        }
    }
}
