//! Application Configuration

use std::time::Duration;

use platform::webhook::DEFAULT_MAX_AGE;

#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Header carrying the provider's compact JWS
    pub signature_header: String,
    /// Oldest webhook signature accepted
    pub webhook_max_age: Duration,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            signature_header: "x-webhook-signature".to_string(),
            webhook_max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl BillingConfig {
    pub fn development() -> Self {
        Self::default()
    }
}
