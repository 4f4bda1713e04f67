use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file accepted by the pipeline and kept on disk
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: usize,
}

/// File upload response DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub mime_type: String,
    pub size: usize,
}
