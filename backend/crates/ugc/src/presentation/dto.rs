//! API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Category, Media, Story};

// ============================================================================
// Stories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStoryRequest {
    pub title: String,
    pub body: String,
    pub language: Option<String>,
    pub category: String,
    pub country_of_origin: Option<String>,
    pub destination_country: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: String,
    /// Hidden for anonymous stories
    pub author_id: Option<String>,
    pub title: String,
    pub body: String,
    pub language: &'static str,
    pub category: String,
    pub country_of_origin: Option<String>,
    pub destination_country: Option<String>,
    pub is_anonymous: bool,
    pub media_ids: Vec<String>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        Self {
            id: story.story_id.to_string(),
            author_id: story.public_author().map(|id| id.to_string()),
            title: story.title.as_str().to_string(),
            body: story.body.as_str().to_string(),
            language: story.language.code(),
            category: story.category_slug.as_str().to_string(),
            country_of_origin: story.country_of_origin.map(|c| c.as_str().to_string()),
            destination_country: story.destination_country.map(|c| c.as_str().to_string()),
            is_anonymous: story.is_anonymous,
            media_ids: story.media_ids.iter().map(|id| id.to_string()).collect(),
            status: story.status.code(),
            created_at: story.created_at,
            published_at: story.published_at,
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.category_id.to_string(),
            slug: category.slug.as_str().to_string(),
            name: category.name,
            description: category.description,
            sort_order: category.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStoriesResponse {
    pub category: CategoryResponse,
    pub stories: kernel::Paginated<StoryResponse>,
}

// ============================================================================
// Media
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Media> for MediaResponse {
    fn from(media: Media) -> Self {
        Self {
            id: media.media_id.to_string(),
            mime_type: media.mime_type,
            size_bytes: media.size_bytes,
            sha256: media.sha256,
            original_filename: media.original_filename,
            created_at: media.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
