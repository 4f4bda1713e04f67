use std::fmt;
use std::path::PathBuf;

use validator::Validate;

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_IMAGE_SIZE, DEFAULT_MAX_VIDEO_DURATION,
    DEFAULT_MAX_VIDEO_SIZE, MB, VIDEO_EXTENSION,
};
use crate::utils::file_extension;

/// Media class of an upload, decides which size ceiling applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_filename(filename: &str) -> Self {
        if file_extension(filename) == VIDEO_EXTENSION {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("Image"),
            MediaKind::Video => f.write_str("Video"),
        }
    }
}

/// Upload validation policy and storage location
#[derive(Debug, Clone, Validate)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub base_url: String,
    #[validate(length(min = 1, message = "At least one extension must be allowed"))]
    pub allowed_extensions: Vec<String>,
    #[validate(range(min = 1, message = "Image size limit must be positive"))]
    pub max_image_size: usize,
    #[validate(range(min = 1, message = "Video size limit must be positive"))]
    pub max_video_size: usize,
    #[validate(range(exclusive_min = 0.0, message = "Video duration limit must be positive"))]
    pub max_video_duration: f64,
}

impl UploadConfig {
    pub fn max_size(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_image_size,
            MediaKind::Video => self.max_video_size,
        }
    }

    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|allowed| allowed == extension)
    }

    /// Human readable list used in the invalid type message,
    /// e.g. `images (jpg, png) and videos (mp4)`.
    pub fn describe_allowed(&self) -> String {
        let (videos, images): (Vec<&str>, Vec<&str>) = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .partition(|ext| format!(".{ext}") == VIDEO_EXTENSION);

        match (images.is_empty(), videos.is_empty()) {
            (false, false) => {
                format!("images ({}) and videos ({})", images.join(", "), videos.join(", "))
            }
            (false, true) => format!("images ({})", images.join(", ")),
            (true, false) => format!("videos ({})", videos.join(", ")),
            (true, true) => "no files".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            base_url: "/api/files".to_string(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.split(',').map(String::from).collect(),
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            max_video_size: DEFAULT_MAX_VIDEO_SIZE,
            max_video_duration: DEFAULT_MAX_VIDEO_DURATION,
        }
    }
}

/// A single incoming upload
#[derive(Debug)]
pub struct NewUpload {
    pub original_filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl NewUpload {
    pub fn new(
        original_filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self { original_filename: original_filename.into(), mime_type: mime_type.into(), bytes }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// `5MB` for whole MiB ceilings, the exact byte count otherwise
fn size_limit_label(limit_bytes: &usize) -> String {
    if *limit_bytes % MB == 0 {
        format!("{}MB", limit_bytes / MB)
    } else {
        format!("{limit_bytes} bytes")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("{kind} size exceeds {} limit", size_limit_label(.limit_bytes))]
    SizeExceeded { kind: MediaKind, limit_bytes: usize },
    #[error("Invalid file type. Only {allowed} are allowed")]
    InvalidType { allowed: String },
    #[error("Video duration exceeds {limit_seconds} seconds limit")]
    DurationExceeded { limit_seconds: f64 },
}
