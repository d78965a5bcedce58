//! Admin CSV export of stories

use std::sync::Arc;

use kernel::{AuthContext, UserRole};
use platform::csv::CsvWriter;

use crate::domain::filter::{ExportFilter, ExportQuery};
use crate::domain::repository::StoryRepository;
use crate::error::UgcResult;

const HEADER: [&str; 11] = [
    "story_id",
    "created_at",
    "published_at",
    "status",
    "language",
    "category",
    "title",
    "author_id",
    "country_of_origin",
    "destination_country",
    "moderation_severity",
];

pub struct ExportStoriesUseCase<R>
where
    R: StoryRepository,
{
    repo: Arc<R>,
}

impl<R> ExportStoriesUseCase<R>
where
    R: StoryRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Returns the CSV document and the number of data rows
    pub async fn execute(&self, ctx: &AuthContext, query: &ExportQuery) -> UgcResult<(String, usize)> {
        ctx.require_role(UserRole::Admin)?;
        let filter = ExportFilter::parse(query)?;
        let stories = self.repo.export(&filter).await?;

        let mut csv = CsvWriter::with_header(HEADER)?;
        for story in &stories {
            csv.push_row([
                story.story_id.to_string(),
                story.created_at.to_rfc3339(),
                story.published_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                story.status.code().to_string(),
                story.language.code().to_string(),
                story.category_slug.to_string(),
                story.title.as_str().to_string(),
                story.author_id.map(|id| id.to_string()).unwrap_or_default(),
                story.country_of_origin.as_ref().map(|c| c.as_str().to_string()).unwrap_or_default(),
                story.destination_country.as_ref().map(|c| c.as_str().to_string()).unwrap_or_default(),
                story.moderation_severity.map(|s| s.code().to_string()).unwrap_or_default(),
            ])?;
        }

        tracing::info!(admin = %ctx.user_id, rows = stories.len(), "Stories exported");
        Ok((csv.finish()?, stories.len()))
    }
}
