//! Review Flag Use Case

use std::sync::Arc;

use kernel::audit::{AuditEvent, AuditHandle};
use kernel::id::FlagId;
use kernel::{AuthContext, UserRole};
use serde_json::json;

use crate::domain::entities::ModerationFlag;
use crate::domain::ports::ContentStatusUpdater;
use crate::domain::repository::FlagRepository;
use crate::domain::value_objects::ReviewDecision;
use crate::error::{ModerationError, ModerationResult};

const MAX_NOTE_CHARS: usize = 1000;

pub struct ReviewFlagInput {
    pub flag_id: FlagId,
    pub decision: ReviewDecision,
    pub note: Option<String>,
}

pub struct ReviewFlagUseCase<F, U>
where
    F: FlagRepository,
    U: ContentStatusUpdater,
{
    repo: Arc<F>,
    content: Arc<U>,
    audit: AuditHandle,
}

impl<F, U> ReviewFlagUseCase<F, U>
where
    F: FlagRepository,
    U: ContentStatusUpdater,
{
    pub fn new(repo: Arc<F>, content: Arc<U>, audit: AuditHandle) -> Self {
        Self {
            repo,
            content,
            audit,
        }
    }

    pub async fn execute(
        &self,
        ctx: &AuthContext,
        input: ReviewFlagInput,
    ) -> ModerationResult<ModerationFlag> {
        ctx.require_role(UserRole::Moderator)?;

        let note = input.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if note.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTE_CHARS) {
            return Err(ModerationError::Validation(format!(
                "Note must be at most {} characters",
                MAX_NOTE_CHARS
            )));
        }

        let mut flag = self
            .repo
            .find_by_id(&input.flag_id)
            .await?
            .ok_or(ModerationError::FlagNotFound)?;

        flag.review(ctx.user_id, input.decision, note)?;

        // Content first: a failed update leaves the flag open for a retry.
        if let Some(decision) = input.decision.content_decision() {
            let applied = self
                .content
                .apply_decision(flag.content_type, flag.content_id, decision)
                .await?;
            if !applied {
                tracing::warn!(
                    flag_id = %flag.flag_id,
                    content_type = %flag.content_type,
                    content_id = %flag.content_id,
                    "Reviewed content no longer exists"
                );
            }
        }

        if !self.repo.save_review(&flag).await? {
            return Err(ModerationError::AlreadyReviewed);
        }

        tracing::info!(
            flag_id = %flag.flag_id,
            reviewer = %ctx.user_id,
            decision = %input.decision,
            "Flag reviewed"
        );

        self.audit.record(
            AuditEvent::new("moderation.flag_reviewed", "moderation_flag")
                .actor(ctx.user_id)
                .target(flag.flag_id)
                .metadata(json!({
                    "decision": input.decision.code(),
                    "content_type": flag.content_type.code(),
                    "content_id": flag.content_id,
                })),
        );

        Ok(flag)
    }
}
