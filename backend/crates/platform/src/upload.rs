//! Upload validation
//!
//! The type of an uploaded file is decided by its magic bytes, never by the
//! client. A declared `Content-Type` is only checked for agreement.

use thiserror::Error;

use crate::crypto::sha256_hex;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "application/pdf",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("File is empty")]
    Empty,

    #[error("File is larger than {max} bytes")]
    TooLarge { max: usize },

    #[error("File type could not be recognised")]
    Unrecognized,

    #[error("File type {0} is not allowed")]
    NotAllowed(&'static str),

    #[error("Declared type {declared} does not match file content ({sniffed})")]
    ContentTypeMismatch {
        declared: String,
        sniffed: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub allowed_types: Vec<&'static str>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.to_vec(),
        }
    }
}

/// What the bytes turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedFile {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub size_bytes: usize,
    pub sha256_hex: String,
}

impl UploadPolicy {
    pub fn inspect(
        &self,
        bytes: &[u8],
        declared_type: Option<&str>,
    ) -> Result<InspectedFile, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max: self.max_bytes,
            });
        }

        let kind = infer::get(bytes).ok_or(UploadError::Unrecognized)?;
        let sniffed = kind.mime_type();

        if !self.allowed_types.contains(&sniffed) {
            return Err(UploadError::NotAllowed(sniffed));
        }

        if let Some(declared) = declared_type.map(essence).filter(|d| !is_generic(d)) {
            if declared != sniffed {
                return Err(UploadError::ContentTypeMismatch {
                    declared,
                    sniffed,
                });
            }
        }

        Ok(InspectedFile {
            mime_type: sniffed,
            extension: kind.extension(),
            size_bytes: bytes.len(),
            sha256_hex: sha256_hex(bytes),
        })
    }
}

/// `Image/JPG; charset=x` -> `image/jpeg`
fn essence(content_type: &str) -> String {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => base,
    }
}

fn is_generic(content_type: &str) -> bool {
    content_type.is_empty() || content_type == "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01\x01";
    const PDF: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";

    #[test]
    fn test_inspect_sniffs_type() {
        let policy = UploadPolicy::default();

        let png = policy.inspect(PNG, Some("image/png")).unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert_eq!(png.extension, "png");
        assert_eq!(png.size_bytes, PNG.len());
        assert_eq!(png.sha256_hex.len(), 64);

        let jpeg = policy.inspect(JPEG, Some("image/jpg")).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");

        assert!(policy.inspect(PDF, None).is_ok());
    }

    #[test]
    fn test_declared_type_must_agree() {
        let policy = UploadPolicy::default();
        let err = policy.inspect(PNG, Some("image/jpeg")).unwrap_err();
        assert!(matches!(err, UploadError::ContentTypeMismatch { sniffed: "image/png", .. }));

        // Generic declarations defer to sniffing
        assert!(policy.inspect(PNG, Some("application/octet-stream")).is_ok());
    }

    #[test]
    fn test_rejections() {
        let policy = UploadPolicy {
            max_bytes: 16,
            allowed_types: vec!["image/png"],
        };
        assert_eq!(policy.inspect(b"", None).unwrap_err(), UploadError::Empty);
        assert_eq!(
            policy.inspect(&[0u8; 17], None).unwrap_err(),
            UploadError::TooLarge { max: 16 }
        );
        assert_eq!(
            policy.inspect(b"plain text", None).unwrap_err(),
            UploadError::Unrecognized
        );
        assert_eq!(
            policy.inspect(JPEG, None).unwrap_err(),
            UploadError::NotAllowed("image/jpeg")
        );
    }
}
