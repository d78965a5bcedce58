//! Local filesystem media storage

use std::path::{Component, Path, PathBuf};

use crate::domain::repository::MediaStorage;
use crate::error::{UgcError, UgcResult};

#[derive(Debug, Clone)]
pub struct DiskMediaStorage {
    root: PathBuf,
}

impl DiskMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `relative` joined onto the root; absolute paths and `..` are refused
    fn resolve(&self, relative: &str) -> UgcResult<PathBuf> {
        let rel = Path::new(relative);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(UgcError::Internal(format!("Refusing storage path {}", relative)));
        }
        Ok(self.root.join(rel))
    }
}

impl MediaStorage for DiskMediaStorage {
    async fn put(&self, relative_path: &str, bytes: &[u8]) -> UgcResult<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Media stored");
        Ok(())
    }
}
