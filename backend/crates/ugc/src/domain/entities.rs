//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::Language;
use kernel::id::{CategoryId, MediaId, StoryId, UserId};
use moderation::{ContentDecision, Severity, Verdict};

use crate::domain::value_objects::{CategorySlug, CountryCode, StoryBody, StoryStatus, StoryTitle};

#[derive(Debug, Clone)]
pub struct Story {
    pub story_id: StoryId,
    /// `None` once the author's data has been erased
    pub author_id: Option<UserId>,
    pub title: StoryTitle,
    pub body: StoryBody,
    pub language: Language,
    pub category_slug: CategorySlug,
    pub country_of_origin: Option<CountryCode>,
    pub destination_country: Option<CountryCode>,
    pub is_anonymous: bool,
    pub media_ids: Vec<MediaId>,
    pub status: StoryStatus,
    pub moderation_severity: Option<Severity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Status a fresh submission gets from its screening verdict
    pub fn status_for_verdict(verdict: Verdict, auto_publish: bool) -> StoryStatus {
        match verdict {
            Verdict::Allow if auto_publish => StoryStatus::Published,
            Verdict::Allow => StoryStatus::Pending,
            Verdict::Review => StoryStatus::Flagged,
            Verdict::Block => StoryStatus::Rejected,
        }
    }

    pub fn set_status(&mut self, status: StoryStatus) {
        let now = Utc::now();
        if status == StoryStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
    }

    pub fn apply_decision(&mut self, decision: ContentDecision) {
        match decision {
            ContentDecision::Publish => self.set_status(StoryStatus::Published),
            ContentDecision::Reject => self.set_status(StoryStatus::Rejected),
        }
    }

    /// Author shown publicly, hidden for anonymous stories
    pub fn public_author(&self) -> Option<UserId> {
        if self.is_anonymous {
            None
        } else {
            self.author_id
        }
    }

    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.author_id.as_ref() == Some(user_id)
    }

    /// Title and body as one text for screening
    pub fn screening_text(&self) -> String {
        format!("{}\n\n{}", self.title.as_str(), self.body.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub category_id: CategoryId,
    pub slug: CategorySlug,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(slug: CategorySlug, name: String, description: Option<String>, sort_order: i32) -> Self {
        Self {
            category_id: CategoryId::new(),
            slug,
            name,
            description,
            sort_order,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// An uploaded file
#[derive(Debug, Clone)]
pub struct Media {
    pub media_id: MediaId,
    pub owner_id: Option<UserId>,
    /// Relative to the media root, e.g. `2026/10/<uuid>.jpg`
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Media {
    pub fn storage_path_for(media_id: &MediaId, extension: &str, at: DateTime<Utc>) -> String {
        format!("{}/{}.{}", at.format("%Y/%m"), media_id, extension)
    }
}
