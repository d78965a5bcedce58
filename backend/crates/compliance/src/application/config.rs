//! Application Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Most audit events written per insert
    pub audit_batch_size: usize,
    /// Pause between retries after a failed batch
    pub audit_retry_delay: Duration,
    /// Failed batches are retried this many times before being dropped
    pub audit_max_retries: u32,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            audit_batch_size: 100,
            audit_retry_delay: Duration::from_secs(2),
            audit_max_retries: 3,
        }
    }
}

impl ComplianceConfig {
    pub fn development() -> Self {
        Self {
            audit_retry_delay: Duration::from_millis(200),
            ..Self::default()
        }
    }
}
