//! API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ModerationFlag;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub id: String,
    pub content_type: &'static str,
    pub content_id: String,
    pub author_id: Option<String>,
    pub rule_ids: Vec<String>,
    pub categories: Vec<&'static str>,
    pub severity: &'static str,
    pub status: &'static str,
    pub excerpt: String,
    pub reviewer_id: Option<String>,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<ModerationFlag> for FlagResponse {
    fn from(flag: ModerationFlag) -> Self {
        Self {
            id: flag.flag_id.to_string(),
            content_type: flag.content_type.code(),
            content_id: flag.content_id.to_string(),
            author_id: flag.author_id.map(|id| id.to_string()),
            rule_ids: flag.rule_ids,
            categories: flag.categories.iter().map(|c| c.code()).collect(),
            severity: flag.severity.code(),
            status: flag.status.code(),
            excerpt: flag.excerpt,
            reviewer_id: flag.reviewer_id.map(|id| id.to_string()),
            resolution_note: flag.resolution_note,
            created_at: flag.created_at,
            resolved_at: flag.resolved_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    /// `approve`, `reject` or `dismiss`
    pub decision: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRequest {
    pub text: String,
}
