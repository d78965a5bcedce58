//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::audit::AuditEvent;
use kernel::id::{AuditLogId, DsarRequestId, UserId};
use serde::Serialize;
use serde_json::Value;

use crate::domain::value_objects::{DsarKind, DsarStatus, Regulation};
use crate::error::{ComplianceError, ComplianceResult};

pub const MAX_DETAILS_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct DsarRequest {
    pub request_id: DsarRequestId,
    pub user_id: UserId,
    pub kind: DsarKind,
    pub regulation: Regulation,
    pub status: DsarStatus,
    pub details: Option<String>,
    pub resolution_note: Option<String>,
    pub handled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl DsarRequest {
    pub fn new(
        user_id: UserId,
        kind: DsarKind,
        regulation: Regulation,
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id: DsarRequestId::new(),
            user_id,
            kind,
            regulation,
            status: DsarStatus::Received,
            details,
            resolution_note: None,
            handled_by: None,
            created_at: now,
            due_at: now + regulation.response_window(),
            completed_at: None,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.due_at < now
    }

    pub fn transition(
        &mut self,
        next: DsarStatus,
        handled_by: UserId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> ComplianceResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ComplianceError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.handled_by = Some(handled_by);
        if note.is_some() {
            self.resolution_note = note;
        }
        if !next.is_open() {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Persisted audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: AuditLogId,
    pub actor_id: Option<UserId>,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub metadata: Value,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEvent> for AuditLog {
    fn from(event: AuditEvent) -> Self {
        Self {
            id: AuditLogId::new(),
            actor_id: event.actor_id,
            action: event.action,
            target_type: event.target_type,
            target_id: event.target_id,
            metadata: event.metadata,
            ip: event.ip,
            created_at: event.created_at,
        }
    }
}

/// Everything held about a data subject, for access requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessBundle {
    pub generated_at: DateTime<Utc>,
    pub profile: Value,
    pub stories: Vec<Value>,
    pub purchases: Vec<Value>,
    pub usage_logs: Vec<Value>,
    pub agent_context: Option<Value>,
    pub dsar_requests: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureReport {
    pub stories_anonymised: u64,
    pub agent_contexts_deleted: u64,
    pub confidence_scores_deleted: u64,
    pub usage_logs_deleted: u64,
    pub media_detached: u64,
    pub flags_detached: u64,
    pub purchases_retained: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_due_date_and_overdue() {
        let now = Utc::now();
        let req = DsarRequest::new(UserId::new(), DsarKind::Access, Regulation::Ccpa, None, now);
        assert_eq!(req.due_at - req.created_at, Duration::days(45));
        assert!(!req.is_overdue(now + Duration::days(44)));
        assert!(req.is_overdue(now + Duration::days(46)));
    }

    #[test]
    fn test_closed_request_never_overdue() {
        let now = Utc::now();
        let admin = UserId::new();
        let mut req = DsarRequest::new(UserId::new(), DsarKind::Erasure, Regulation::Gdpr, None, now);
        req.transition(DsarStatus::InProgress, admin, None, now).unwrap();
        assert!(req.completed_at.is_none());
        req.transition(DsarStatus::Completed, admin, Some("done".into()), now)
            .unwrap();
        assert_eq!(req.completed_at, Some(now));
        assert!(!req.is_overdue(now + Duration::days(60)));

        assert!(matches!(
            req.transition(DsarStatus::Rejected, admin, None, now),
            Err(ComplianceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_audit_log_from_event() {
        let actor = UserId::new();
        let log = AuditLog::from(
            AuditEvent::new("agent.disabled", "agent")
                .actor(actor)
                .target("lumo")
                .ip(Some("198.51.100.4".into())),
        );
        assert_eq!(log.actor_id, Some(actor));
        assert_eq!(log.target_id.as_deref(), Some("lumo"));
        assert_eq!(log.ip.as_deref(), Some("198.51.100.4"));
    }
}
