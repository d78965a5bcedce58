//! Application Configuration

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Who receives moderation alert emails
    pub alert_recipients: Vec<String>,
    /// Minimum gap between alerts with the same key on the same day
    pub alert_min_interval: Duration,
    /// Language of alert emails
    pub alert_language: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            alert_recipients: Vec::new(),
            alert_min_interval: Duration::hours(1),
            alert_language: "en".to_string(),
        }
    }
}

impl ModerationConfig {
    pub fn development() -> Self {
        Self {
            alert_recipients: vec!["moderators@localhost.test".to_string()],
            ..Default::default()
        }
    }

    /// Comma-separated list, blanks dropped
    pub fn with_recipients(mut self, list: &str) -> Self {
        self.alert_recipients = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}
