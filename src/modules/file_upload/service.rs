use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::api::error;
use crate::constants::MAX_STORED_NAME_BYTES;
use crate::modules::file_upload::{
    model::{MediaKind, NewUpload, UploadConfig, UploadError},
    prober::DurationProber,
    schema::StoredFile,
};
use crate::utils::{file_extension, random_token, sanitize_filename, truncate_filename};

pub struct FileUploadService<P>
where
    P: DurationProber + Send + Sync,
{
    prober: Arc<P>,
    config: UploadConfig,
}

async fn write_payload(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

impl<P> FileUploadService<P>
where
    P: DurationProber + Send + Sync,
{
    pub fn new(prober: Arc<P>, config: UploadConfig) -> Self {
        log::info!(
            "FileUploadService initialized, storing uploads in {}",
            config.upload_dir.display()
        );
        Self { prober, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Create the upload directory if it doesn't exist
    pub async fn ensure_upload_dir(&self) -> Result<(), error::SystemError> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        Ok(())
    }

    /// Public URL a stored file is served from
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), filename)
    }

    /// Validate file size and extension
    fn validate_file(&self, filename: &str, file_size: usize) -> Result<MediaKind, UploadError> {
        let kind = MediaKind::from_filename(filename);

        // Check file size
        let limit_bytes = self.config.max_size(kind);
        if file_size > limit_bytes {
            return Err(UploadError::SizeExceeded { kind, limit_bytes });
        }

        // Check extension
        if !self.config.is_allowed(&file_extension(filename)) {
            return Err(UploadError::InvalidType { allowed: self.config.describe_allowed() });
        }

        Ok(kind)
    }

    /// Generate unique filename, short enough for the filesystem
    fn generate_filename(&self, sanitized_name: &str) -> String {
        let token = random_token();
        let name = truncate_filename(sanitized_name, MAX_STORED_NAME_BYTES - token.len() - 1);
        format!("{token}-{name}")
    }

    /// Save file to disk
    async fn save_file(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, error::SystemError> {
        self.ensure_upload_dir().await?;

        let file_path = self.config.upload_dir.join(filename);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await?;

        if let Err(err) = write_payload(&mut file, bytes).await {
            drop(file);
            tokio::fs::remove_file(&file_path).await.ok();
            return Err(err.into());
        }

        Ok(file_path)
    }

    async fn has_valid_duration(&self, file_path: &Path) -> bool {
        match self.prober.probe_duration(file_path).await {
            Ok(duration) => {
                log::debug!("Probed {}: {duration}s", file_path.display());
                duration <= self.config.max_video_duration
            }
            Err(err) => {
                log::warn!("Could not probe {}: {err}", file_path.display());
                false
            }
        }
    }

    /// Remove a stored file that failed a post-write check
    async fn discard_file(&self, file_path: &Path) {
        match tokio::fs::remove_file(file_path).await {
            Ok(()) => log::info!("Removed rejected upload {}", file_path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                log::error!("Failed to remove rejected upload {}: {err}", file_path.display())
            }
        }
    }

    /// Validate and store an upload, probing videos after the write
    pub async fn upload_file(&self, upload: NewUpload) -> Result<StoredFile, error::SystemError> {
        let kind =
            self.validate_file(&upload.original_filename, upload.size()).inspect_err(|err| {
                log::info!("Rejected upload {:?}: {err}", upload.original_filename);
            })?;

        let original_name = sanitize_filename(&upload.original_filename);
        let filename = self.generate_filename(&original_name);
        let file_path = self.save_file(&filename, &upload.bytes).await?;

        if kind == MediaKind::Video && !self.has_valid_duration(&file_path).await {
            self.discard_file(&file_path).await;
            return Err(UploadError::DurationExceeded {
                limit_seconds: self.config.max_video_duration,
            }
            .into());
        }

        log::info!("Stored upload {} ({} bytes)", filename, upload.size());
        Ok(StoredFile {
            path: file_path,
            filename,
            original_name,
            size: upload.size(),
            mime_type: upload.mime_type,
        })
    }

    /// Resolve a stored file by name, `None` if it doesn't exist
    pub async fn get_file(&self, filename: &str) -> Result<Option<PathBuf>, error::SystemError> {
        let sanitized = sanitize_filename(filename);
        if sanitized.chars().all(|c| c == '.') {
            return Ok(None);
        }

        let file_path = self.config.upload_dir.join(&sanitized);
        match tokio::fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => Ok(Some(file_path)),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
