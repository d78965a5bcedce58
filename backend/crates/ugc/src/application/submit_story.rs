//! Submit Story Use Case
//!
//! Validates a story, screens title + body, and stores it with the status
//! the verdict implies. Blocked stories are kept (rejected) for the
//! moderation record and reported to the author as 422.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use kernel::audit::{AuditEvent, AuditHandle};
use kernel::id::{MediaId, StoryId};
use kernel::{AuthContext, Language};
use moderation::{ContentScreener, ContentSubmission, ContentType, Verdict};
use platform::mailer::{EmailMessage, EmailTemplate, Mailer};
use serde_json::json;

use crate::application::config::UgcConfig;
use crate::domain::entities::Story;
use crate::domain::repository::{AuthorDirectory, CategoryRepository, MediaRepository, StoryRepository};
use crate::domain::value_objects::{CategorySlug, CountryCode, StoryBody, StoryStatus, StoryTitle};
use crate::error::{UgcError, UgcResult};

pub struct SubmitStoryInput {
    pub title: String,
    pub body: String,
    pub language: Option<String>,
    pub category: String,
    pub country_of_origin: Option<String>,
    pub destination_country: Option<String>,
    pub is_anonymous: bool,
    pub media_ids: Vec<String>,
    pub ip: Option<String>,
}

pub struct SubmitStoryUseCase<R, S, M>
where
    R: StoryRepository + CategoryRepository + MediaRepository + AuthorDirectory,
    S: ContentScreener,
    M: Mailer,
{
    repo: Arc<R>,
    screener: Arc<S>,
    mailer: Arc<M>,
    audit: AuditHandle,
    config: Arc<UgcConfig>,
}

impl<R, S, M> SubmitStoryUseCase<R, S, M>
where
    R: StoryRepository + CategoryRepository + MediaRepository + AuthorDirectory + Sync,
    S: ContentScreener + Sync,
    M: Mailer + Sync,
{
    pub fn new(
        repo: Arc<R>,
        screener: Arc<S>,
        mailer: Arc<M>,
        audit: AuditHandle,
        config: Arc<UgcConfig>,
    ) -> Self {
        Self {
            repo,
            screener,
            mailer,
            audit,
            config,
        }
    }

    pub async fn execute(&self, ctx: &AuthContext, input: SubmitStoryInput) -> UgcResult<Story> {
        let title = StoryTitle::parse(&input.title)?;
        let body = StoryBody::parse(&input.body)?;
        let language = match input.language.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Language::from_code(code)
                .ok_or_else(|| UgcError::Validation(format!("Unsupported language: {}", code)))?,
            None => ctx.language,
        };
        let country_of_origin = CountryCode::parse_optional(input.country_of_origin.as_deref())?;
        let destination_country = CountryCode::parse_optional(input.destination_country.as_deref())?;

        let slug = CategorySlug::parse(&input.category)?;
        let category = CategoryRepository::find_by_slug(&*self.repo, &slug)
            .await?
            .filter(|c| c.is_active)
            .ok_or(UgcError::CategoryNotFound)?;

        let media_ids = self.owned_media(ctx, &input.media_ids).await?;

        let now = Utc::now();
        let mut story = Story {
            story_id: StoryId::new(),
            author_id: Some(ctx.user_id),
            title,
            body,
            language,
            category_slug: category.slug,
            country_of_origin,
            destination_country,
            is_anonymous: input.is_anonymous,
            media_ids,
            status: StoryStatus::Pending,
            moderation_severity: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        };

        let text = story.screening_text();
        let outcome = self
            .screener
            .screen_submission(ContentSubmission {
                content_type: ContentType::Story,
                content_id: story.story_id.into_uuid(),
                author_id: Some(ctx.user_id),
                text: &text,
            })
            .await?;

        let verdict = outcome.result.verdict;
        story.moderation_severity = outcome.result.max_severity;
        story.set_status(Story::status_for_verdict(verdict, self.config.auto_publish));

        StoryRepository::create(&*self.repo, &story).await?;

        tracing::info!(
            story_id = %story.story_id,
            author_id = %ctx.user_id,
            status = %story.status,
            verdict = %verdict,
            "Story submitted"
        );

        self.audit.record(
            AuditEvent::new("story.submitted", "story")
                .actor(ctx.user_id)
                .target(story.story_id)
                .metadata(json!({
                    "status": story.status.code(),
                    "verdict": verdict.code(),
                    "flag_id": outcome.flag.as_ref().map(|f| f.flag_id.to_string()),
                }))
                .ip(input.ip),
        );

        let template = if verdict == Verdict::Block {
            EmailTemplate::StoryRejected
        } else if story.status == StoryStatus::Published {
            EmailTemplate::StoryPublished
        } else {
            EmailTemplate::StoryReceived
        };
        self.notify_author(ctx, &story, template).await;

        if verdict == Verdict::Block {
            return Err(UgcError::ContentRejected);
        }
        Ok(story)
    }

    async fn owned_media(&self, ctx: &AuthContext, raw_ids: &[String]) -> UgcResult<Vec<MediaId>> {
        if raw_ids.len() > self.config.max_media_per_story {
            return Err(UgcError::Validation(format!(
                "At most {} media items per story",
                self.config.max_media_per_story
            )));
        }

        let mut seen = HashSet::new();
        let ids = raw_ids
            .iter()
            .map(|raw| {
                raw.parse::<MediaId>()
                    .map_err(|_| UgcError::Validation(format!("Invalid media id: {}", raw)))
            })
            .collect::<UgcResult<Vec<_>>>()?
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect::<Vec<_>>();

        if ids.is_empty() {
            return Ok(ids);
        }

        let owned = self.repo.find_owned(&ids, &ctx.user_id).await?;
        if owned.len() != ids.len() {
            return Err(UgcError::MediaNotOwned);
        }
        Ok(ids)
    }

    async fn notify_author(&self, ctx: &AuthContext, story: &Story, template: EmailTemplate) {
        let contact = match self.repo.contact(&ctx.user_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not look up story author");
                return;
            }
        };

        let message = EmailMessage::new(contact.email, template, contact.language.code())
            .with_data(json!({
                "story_id": story.story_id.to_string(),
                "story_title": story.title.as_str(),
                "status": story.status.code(),
            }));
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(error = %e, story_id = %story.story_id, "Story email failed");
        }
    }
}
