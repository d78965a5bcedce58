//! API DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::DsarUpdate;
use crate::domain::entities::{DsarRequest, ErasureReport};
use crate::domain::filter::{AuditQuery, DsarListQuery};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitDsarRequest {
    pub kind: String,
    pub regulation: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DsarResponse {
    pub id: String,
    pub kind: &'static str,
    pub regulation: &'static str,
    pub status: &'static str,
    pub details: Option<String>,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}

impl From<DsarRequest> for DsarResponse {
    fn from(r: DsarRequest) -> Self {
        Self {
            overdue: r.is_overdue(Utc::now()),
            id: r.request_id.to_string(),
            kind: r.kind.code(),
            regulation: r.regulation.code(),
            status: r.status.code(),
            details: r.details,
            resolution_note: r.resolution_note,
            created_at: r.created_at,
            due_at: r.due_at,
            completed_at: r.completed_at,
        }
    }
}

/// Admin view includes the requester
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDsarResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub request: DsarResponse,
}

impl From<DsarRequest> for AdminDsarResponse {
    fn from(r: DsarRequest) -> Self {
        Self {
            user_id: r.user_id.to_string(),
            request: DsarResponse::from(r),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDsarStatusRequest {
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DsarUpdateResponse {
    pub request: AdminDsarResponse,
    pub erasure: Option<ErasureReport>,
}

impl From<DsarUpdate> for DsarUpdateResponse {
    fn from(u: DsarUpdate) -> Self {
        Self {
            request: AdminDsarResponse::from(u.request),
            erasure: u.erasure,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminDsarQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub overdue: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AdminDsarQuery {
    pub fn filter(&self) -> DsarListQuery {
        DsarListQuery {
            status: self.status.clone(),
            kind: self.kind.clone(),
            overdue: self.overdue,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListQuery {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AuditListQuery {
    pub fn filter(&self) -> AuditQuery {
        AuditQuery {
            actor_id: self.actor_id.clone(),
            action: self.action.clone(),
            target_type: self.target_type.clone(),
            target_id: self.target_id.clone(),
            from: self.from,
            to: self.to,
        }
    }
}
