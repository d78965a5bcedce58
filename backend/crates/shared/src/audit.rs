//! Audit trail handle
//!
//! Any crate can record an [`AuditEvent`] through a cloned [`AuditHandle`].
//! Events go over a bounded channel to a single background writer owned by
//! the compliance crate. Recording never blocks and never fails a request:
//! when the channel is full or closed the event is logged and dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::id::UserId;

/// Default channel capacity
pub const AUDIT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub actor_id: Option<UserId>,
    /// Dotted verb, e.g. `story.submitted`, `agent.toggled`
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub metadata: serde_json::Value,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            action: action.into(),
            target_type: target_type.into(),
            target_id: None,
            metadata: serde_json::Value::Object(Default::default()),
            ip: None,
            created_at: Utc::now(),
        }
    }

    pub fn actor(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn target(mut self, target_id: impl ToString) -> Self {
        self.target_id = Some(target_id.to_string());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }
}

#[derive(Debug, Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditHandle {
    /// Create a handle and the receiver the writer task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// A handle whose receiver is already gone. Events are logged and dropped.
    pub fn disconnected() -> Self {
        let (handle, _rx) = Self::channel(1);
        handle
    }

    pub fn record(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    action = %event.action,
                    target_type = %event.target_type,
                    "Audit channel full, event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::error!(
                    action = %event.action,
                    target_type = %event.target_type,
                    "Audit writer stopped, event dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_delivers_event() {
        let (handle, mut rx) = AuditHandle::channel(4);
        let actor = UserId::new();
        handle.record(
            AuditEvent::new("story.submitted", "story")
                .actor(actor)
                .target("abc")
                .metadata(serde_json::json!({ "status": "published" })),
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, "story.submitted");
        assert_eq!(event.actor_id, Some(actor));
        assert_eq!(event.target_id.as_deref(), Some("abc"));
        assert_eq!(event.metadata["status"], "published");
    }

    #[tokio::test]
    async fn test_record_never_blocks_when_full() {
        let (handle, mut rx) = AuditHandle::channel(1);
        handle.record(AuditEvent::new("a", "x"));
        handle.record(AuditEvent::new("b", "x"));

        assert_eq!(rx.recv().await.unwrap().action, "a");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_handle_drops_silently() {
        AuditHandle::disconnected().record(AuditEvent::new("noop", "x"));
    }
}
