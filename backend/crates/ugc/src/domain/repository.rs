//! Repository Traits

use kernel::Pagination;
use kernel::id::{MediaId, StoryId, UserId};
use kernel::Language;

use crate::domain::entities::{Category, Media, Story};
use crate::domain::filter::{ExportFilter, StoryFilter};
use crate::domain::value_objects::CategorySlug;
use crate::error::UgcResult;

#[trait_variant::make(StoryRepository: Send)]
pub trait LocalStoryRepository {
    async fn create(&self, story: &Story) -> UgcResult<()>;

    async fn find_by_id(&self, story_id: &StoryId) -> UgcResult<Option<Story>>;

    /// Published stories, newest first
    async fn list_published(
        &self,
        filter: &StoryFilter,
        pagination: Pagination,
    ) -> UgcResult<(Vec<Story>, i64)>;

    async fn list_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> UgcResult<(Vec<Story>, i64)>;

    /// Returns `false` when the story does not exist
    async fn update_status(&self, story: &Story) -> UgcResult<bool>;

    async fn export(&self, filter: &ExportFilter) -> UgcResult<Vec<Story>>;
}

#[trait_variant::make(CategoryRepository: Send)]
pub trait LocalCategoryRepository {
    async fn list_active(&self) -> UgcResult<Vec<Category>>;

    async fn find_by_slug(&self, slug: &CategorySlug) -> UgcResult<Option<Category>>;

    /// Returns `false` if the slug is already taken
    async fn create(&self, category: &Category) -> UgcResult<bool>;
}

#[trait_variant::make(MediaRepository: Send)]
pub trait LocalMediaRepository {
    async fn create(&self, media: &Media) -> UgcResult<()>;

    /// The subset of `ids` owned by `owner`
    async fn find_owned(&self, ids: &[MediaId], owner: &UserId) -> UgcResult<Vec<Media>>;
}

/// Contact details for story emails
#[derive(Debug, Clone)]
pub struct AuthorContact {
    pub email: String,
    pub language: Language,
}

#[trait_variant::make(AuthorDirectory: Send)]
pub trait LocalAuthorDirectory {
    async fn contact(&self, user_id: &UserId) -> UgcResult<Option<AuthorContact>>;
}

/// Where uploaded bytes are written
#[trait_variant::make(MediaStorage: Send)]
pub trait LocalMediaStorage {
    async fn put(&self, relative_path: &str, bytes: &[u8]) -> UgcResult<()>;
}
