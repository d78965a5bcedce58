//! Moderation alerts
//!
//! Emails moderators about new high/critical flags, throttled per alert key.

use std::sync::Arc;

use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use serde_json::json;

use crate::application::config::ModerationConfig;
use crate::domain::entities::ModerationFlag;
use crate::domain::services::AlertThrottle;

pub struct AlertNotifier<M>
where
    M: Mailer,
{
    mailer: Arc<M>,
    throttle: AlertThrottle,
    config: Arc<ModerationConfig>,
}

impl<M> AlertNotifier<M>
where
    M: Mailer + Sync,
{
    pub fn new(mailer: Arc<M>, config: Arc<ModerationConfig>) -> Self {
        Self {
            mailer,
            throttle: AlertThrottle::new(config.alert_min_interval),
            config,
        }
    }

    /// Returns the number of emails sent.
    pub async fn notify(&self, flag: &ModerationFlag) -> usize {
        if !flag.severity.is_alerting() || self.config.alert_recipients.is_empty() {
            return 0;
        }

        let key = flag.alert_key();
        if !self.throttle.should_notify(&key) {
            tracing::debug!(key = %key, flag_id = %flag.flag_id, "Moderation alert throttled");
            return 0;
        }

        let data = json!({
            "flag_id": flag.flag_id.to_string(),
            "content_type": flag.content_type.code(),
            "severity": flag.severity.code(),
            "categories": flag.categories.iter().map(|c| c.code()).collect::<Vec<_>>(),
            "excerpt": flag.excerpt,
        });

        let mut sent = 0;
        for recipient in &self.config.alert_recipients {
            let message = EmailMessage::new(
                recipient.as_str(),
                EmailTemplate::ModerationAlert,
                self.config.alert_language.as_str(),
            )
            .with_data(data.clone());

            match self.mailer.send(&message).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(error = %e, flag_id = %flag.flag_id, "Moderation alert failed");
                }
            }
        }

        tracing::info!(key = %key, flag_id = %flag.flag_id, sent, "Moderation alert sent");
        sent
    }
}
