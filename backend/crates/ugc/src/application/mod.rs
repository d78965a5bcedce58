//! Application Layer

pub mod browse_stories;
pub mod config;
pub mod export_stories;
pub mod manage_categories;
pub mod submit_story;
pub mod upload_media;

pub use browse_stories::BrowseStoriesUseCase;
pub use config::UgcConfig;
pub use export_stories::ExportStoriesUseCase;
pub use manage_categories::{CreateCategoryInput, ManageCategoriesUseCase};
pub use submit_story::{SubmitStoryInput, SubmitStoryUseCase};
pub use upload_media::{UploadMediaInput, UploadMediaUseCase};
