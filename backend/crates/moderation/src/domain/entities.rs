//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{FlagId, UserId};
use uuid::Uuid;

use crate::domain::services::{ScreeningResult, excerpt};
use crate::domain::value_objects::{ContentType, FlagStatus, ReviewDecision, RuleCategory, Severity};
use crate::error::{ModerationError, ModerationResult};

/// Characters of the screened text kept on the flag
pub const EXCERPT_CHARS: usize = 280;

#[derive(Debug, Clone)]
pub struct ModerationFlag {
    pub flag_id: FlagId,
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub author_id: Option<UserId>,
    pub rule_ids: Vec<String>,
    pub categories: Vec<RuleCategory>,
    pub severity: Severity,
    pub status: FlagStatus,
    pub excerpt: String,
    pub reviewer_id: Option<UserId>,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ModerationFlag {
    /// A new open flag, or `None` when nothing matched.
    pub fn from_screening(
        content_type: ContentType,
        content_id: Uuid,
        author_id: Option<UserId>,
        result: &ScreeningResult,
        text: &str,
    ) -> Option<Self> {
        let severity = result.max_severity?;
        Some(Self {
            flag_id: FlagId::new(),
            content_type,
            content_id,
            author_id,
            rule_ids: result.rule_ids(),
            categories: result.categories(),
            severity,
            status: FlagStatus::Open,
            excerpt: excerpt(text, EXCERPT_CHARS),
            reviewer_id: None,
            resolution_note: None,
            created_at: Utc::now(),
            resolved_at: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == FlagStatus::Open
    }

    /// Key the alert throttle groups notifications by
    pub fn alert_key(&self) -> String {
        let category = self
            .categories
            .first()
            .map(|c| c.code())
            .unwrap_or("uncategorized");
        format!("{}:{}", self.content_type.code(), category)
    }

    pub fn review(
        &mut self,
        reviewer: UserId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> ModerationResult<()> {
        if !self.is_open() {
            return Err(ModerationError::AlreadyReviewed);
        }
        self.status = decision.resulting_status();
        self.reviewer_id = Some(reviewer);
        self.resolution_note = note;
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::ContentFilter;

    fn flagged() -> ModerationFlag {
        let text = "Guaranteed visa in 10 days! Send money via Western Union.";
        let result = ContentFilter::with_default_rules().unwrap().screen(text);
        ModerationFlag::from_screening(ContentType::Story, Uuid::new_v4(), None, &result, text)
            .unwrap()
    }

    #[test]
    fn test_from_screening() {
        let flag = flagged();
        assert_eq!(flag.severity, Severity::High);
        assert_eq!(flag.categories, vec![RuleCategory::Scam]);
        assert_eq!(flag.rule_ids, vec!["scam-guarantee", "scam-payment"]);
        assert_eq!(flag.alert_key(), "story:scam");
        assert!(flag.is_open());
    }

    #[test]
    fn test_clean_text_gives_no_flag() {
        let result = ScreeningResult::allow();
        assert!(
            ModerationFlag::from_screening(ContentType::Media, Uuid::new_v4(), None, &result, "")
                .is_none()
        );
    }

    #[test]
    fn test_review_only_from_open() {
        let mut flag = flagged();
        let reviewer = UserId::new();
        flag.review(reviewer, ReviewDecision::Dismiss, Some("satire".into()))
            .unwrap();
        assert_eq!(flag.status, FlagStatus::Dismissed);
        assert_eq!(flag.reviewer_id, Some(reviewer));
        assert!(flag.resolved_at.is_some());

        let err = flag.review(reviewer, ReviewDecision::Reject, None).unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyReviewed));
    }
}
