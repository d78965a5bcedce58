//! Application Configuration

use platform::upload::UploadPolicy;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UgcConfig {
    /// Publish clean submissions immediately instead of queueing them
    pub auto_publish: bool,
    /// Root directory for uploaded media
    pub media_root: PathBuf,
    pub upload: UploadPolicy,
    /// Media items attachable to one story
    pub max_media_per_story: usize,
}

impl Default for UgcConfig {
    fn default() -> Self {
        Self {
            auto_publish: true,
            media_root: PathBuf::from("./media"),
            upload: UploadPolicy::default(),
            max_media_per_story: 10,
        }
    }
}

impl UgcConfig {
    pub fn development() -> Self {
        Self::default()
    }

    pub fn with_media_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.media_root = root.into();
        self
    }
}
