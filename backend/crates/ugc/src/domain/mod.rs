//! Domain Layer

pub mod entities;
pub mod filter;
pub mod repository;
pub mod value_objects;

pub use entities::{Category, Media, Story};
pub use filter::{ExportFilter, ExportQuery, StoryFilter, StoryQuery};
pub use repository::{
    AuthorContact, AuthorDirectory, CategoryRepository, MediaRepository, MediaStorage,
    StoryRepository,
};
pub use value_objects::{CategorySlug, CountryCode, StoryBody, StoryStatus, StoryTitle};
