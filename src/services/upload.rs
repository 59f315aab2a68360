/*
 * Responsibility
 * - profile image storage on the local filesystem
 * - extension allowlist, size limit, `avatar-<unix-millis>.<ext>` naming
 * - public URL under `/uploads/`
 */
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::UploadConfig;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file type not allowed")]
    InvalidType,
    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("upload storage: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_bytes,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Lowercased extension of `original`, if it is an allowed image type.
    pub fn allowed_extension(original: &str) -> Result<String, UploadError> {
        let ext = Path::new(original)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(UploadError::InvalidType)?;

        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(UploadError::InvalidType)
        }
    }

    pub fn file_name(field: &str, ext: &str, millis: i64) -> String {
        format!("{field}-{millis}.{ext}")
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, file_name)
    }

    /// Validates and writes `bytes`; the caller has already buffered the field.
    pub async fn save(
        &self,
        field: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, UploadError> {
        let ext = Self::allowed_extension(original_name)?;
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let millis = chrono::Utc::now().timestamp_millis();
        let file_name = Self::file_name(field, &ext, millis);

        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "stored upload");

        Ok(StoredFile {
            url: self.public_url(&file_name),
            file_name,
        })
    }
}
