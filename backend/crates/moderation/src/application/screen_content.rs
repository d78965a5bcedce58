//! Screen Content Use Case
//!
//! Runs the content filter and opens a flag for anything not allowed
//! outright. Shared by story submission and agent chat.

use std::sync::Arc;

use platform::mailer::Mailer;

use crate::application::notify::AlertNotifier;
use crate::domain::entities::ModerationFlag;
use crate::domain::ports::{ContentScreener, ContentSubmission, ScreeningOutcome};
use crate::domain::repository::FlagRepository;
use crate::domain::services::{ContentFilter, ScreeningResult};
use crate::error::ModerationResult;

pub struct ScreenContentUseCase<F, M>
where
    F: FlagRepository,
    M: Mailer,
{
    repo: Arc<F>,
    filter: Arc<ContentFilter>,
    notifier: Arc<AlertNotifier<M>>,
}

impl<F, M> ScreenContentUseCase<F, M>
where
    F: FlagRepository + Sync,
    M: Mailer + Sync,
{
    pub fn new(repo: Arc<F>, filter: Arc<ContentFilter>, notifier: Arc<AlertNotifier<M>>) -> Self {
        Self {
            repo,
            filter,
            notifier,
        }
    }

    /// Verdict only, nothing stored
    pub fn preview(&self, text: &str) -> ScreeningResult {
        self.filter.screen(text)
    }
}

impl<F, M> ContentScreener for ScreenContentUseCase<F, M>
where
    F: FlagRepository + Sync,
    M: Mailer + Sync + Send,
{
    async fn screen_submission(
        &self,
        submission: ContentSubmission<'_>,
    ) -> ModerationResult<ScreeningOutcome> {
        let result = self.filter.screen(submission.text);

        let flag = ModerationFlag::from_screening(
            submission.content_type,
            submission.content_id,
            submission.author_id,
            &result,
            submission.text,
        );

        if let Some(flag) = &flag {
            self.repo.create(flag).await?;

            tracing::info!(
                flag_id = %flag.flag_id,
                content_type = %flag.content_type,
                content_id = %flag.content_id,
                severity = %flag.severity,
                verdict = %result.verdict,
                "Content flagged"
            );

            self.notifier.notify(flag).await;
        }

        Ok(ScreeningOutcome { result, flag })
    }
}
