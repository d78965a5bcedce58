//! Browse Stories Use Case
//!
//! Public reads plus the author's own list.

use std::sync::Arc;

use kernel::id::StoryId;
use kernel::{AuthContext, Paginated, Pagination};

use crate::domain::entities::{Category, Story};
use crate::domain::filter::{StoryFilter, StoryQuery};
use crate::domain::repository::{CategoryRepository, StoryRepository};
use crate::domain::value_objects::CategorySlug;
use crate::error::{UgcError, UgcResult};

pub struct BrowseStoriesUseCase<R>
where
    R: StoryRepository + CategoryRepository,
{
    repo: Arc<R>,
}

impl<R> BrowseStoriesUseCase<R>
where
    R: StoryRepository + CategoryRepository + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &StoryQuery) -> UgcResult<Paginated<Story>> {
        let filter = StoryFilter::parse(query)?;
        let pagination = Pagination::new(query.page, query.limit);
        let (items, total) = self.repo.list_published(&filter, pagination).await?;
        Ok(Paginated::new(items, pagination, total))
    }

    /// Unknown or inactive categories are 404
    pub async fn list_by_category(
        &self,
        slug: &str,
        query: &StoryQuery,
    ) -> UgcResult<(Category, Paginated<Story>)> {
        let slug = CategorySlug::parse(slug).map_err(|_| UgcError::CategoryNotFound)?;
        let category = CategoryRepository::find_by_slug(&*self.repo, &slug)
            .await?
            .filter(|c| c.is_active)
            .ok_or(UgcError::CategoryNotFound)?;

        let mut filter = StoryFilter::parse(query)?;
        filter.category = Some(category.slug.clone());
        let pagination = Pagination::new(query.page, query.limit);
        let (items, total) = self.repo.list_published(&filter, pagination).await?;

        Ok((category, Paginated::new(items, pagination, total)))
    }

    /// Published stories for everyone; anything else only for the author
    /// and moderators.
    pub async fn get(&self, ctx: Option<&AuthContext>, story_id: &StoryId) -> UgcResult<Story> {
        let story = StoryRepository::find_by_id(&*self.repo, story_id)
            .await?
            .ok_or(UgcError::StoryNotFound)?;

        if story.status.is_public() {
            return Ok(story);
        }

        let allowed = ctx.is_some_and(|ctx| {
            story.is_authored_by(&ctx.user_id) || ctx.role.is_moderator_or_higher()
        });
        if allowed { Ok(story) } else { Err(UgcError::StoryNotFound) }
    }

    pub async fn mine(
        &self,
        ctx: &AuthContext,
        pagination: Pagination,
    ) -> UgcResult<Paginated<Story>> {
        let (items, total) = self.repo.list_by_author(&ctx.user_id, pagination).await?;
        Ok(Paginated::new(items, pagination, total))
    }

    pub async fn categories(&self) -> UgcResult<Vec<Category>> {
        self.repo.list_active().await
    }
}
