//! Upload Media Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::AuthContext;
use kernel::audit::{AuditEvent, AuditHandle};
use kernel::id::MediaId;

use crate::application::config::UgcConfig;
use crate::domain::entities::Media;
use crate::domain::repository::{MediaRepository, MediaStorage};
use crate::error::UgcResult;

pub struct UploadMediaInput {
    pub bytes: Vec<u8>,
    pub declared_type: Option<String>,
    pub filename: Option<String>,
    pub ip: Option<String>,
}

pub struct UploadMediaUseCase<R, F>
where
    R: MediaRepository,
    F: MediaStorage,
{
    repo: Arc<R>,
    storage: Arc<F>,
    audit: AuditHandle,
    config: Arc<UgcConfig>,
}

impl<R, F> UploadMediaUseCase<R, F>
where
    R: MediaRepository,
    F: MediaStorage,
{
    pub fn new(repo: Arc<R>, storage: Arc<F>, audit: AuditHandle, config: Arc<UgcConfig>) -> Self {
        Self {
            repo,
            storage,
            audit,
            config,
        }
    }

    pub async fn execute(&self, ctx: &AuthContext, input: UploadMediaInput) -> UgcResult<Media> {
        let inspected = self
            .config
            .upload
            .inspect(&input.bytes, input.declared_type.as_deref())?;

        let media_id = MediaId::new();
        let now = Utc::now();
        let storage_path = Media::storage_path_for(&media_id, inspected.extension, now);

        self.storage.put(&storage_path, &input.bytes).await?;

        let media = Media {
            media_id,
            owner_id: Some(ctx.user_id),
            storage_path,
            mime_type: inspected.mime_type.to_string(),
            size_bytes: inspected.size_bytes as i64,
            sha256: inspected.sha256_hex,
            original_filename: input.filename.map(|f| sanitize_filename(&f)),
            created_at: now,
        };
        self.repo.create(&media).await?;

        tracing::info!(
            media_id = %media.media_id,
            mime = %media.mime_type,
            size = media.size_bytes,
            "Media uploaded"
        );
        self.audit.record(
            AuditEvent::new("media.uploaded", "media")
                .actor(ctx.user_id)
                .target(media.media_id)
                .metadata(serde_json::json!({
                    "mime_type": media.mime_type,
                    "size_bytes": media.size_bytes,
                }))
                .ip(input.ip),
        );

        Ok(media)
    }
}

/// Last path component, control characters dropped, at most 255 chars
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars().filter(|c| !c.is_control()).take(255).collect()
}
