//! Ports used by other crates
//!
//! Content stores implement [`ContentStatusUpdater`] so reviews can change
//! visibility. Content producers call a [`ContentScreener`] before saving.

use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::entities::ModerationFlag;
use crate::domain::services::ScreeningResult;
use crate::domain::value_objects::{ContentDecision, ContentType};
use crate::error::ModerationResult;

#[trait_variant::make(ContentStatusUpdater: Send)]
pub trait LocalContentStatusUpdater {
    /// Returns `false` when the content does not exist or is not handled.
    async fn apply_decision(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        decision: ContentDecision,
    ) -> ModerationResult<bool>;
}

#[derive(Debug, Clone, Copy)]
pub struct ContentSubmission<'a> {
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub author_id: Option<UserId>,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub result: ScreeningResult,
    /// Set when the content was flagged
    pub flag: Option<ModerationFlag>,
}

#[trait_variant::make(ContentScreener: Send)]
pub trait LocalContentScreener {
    /// Screen text and open a flag for anything that is not allowed outright.
    async fn screen_submission(
        &self,
        submission: ContentSubmission<'_>,
    ) -> ModerationResult<ScreeningOutcome>;
}
