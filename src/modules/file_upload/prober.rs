use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run media prober: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Media prober timed out after {0:?}")]
    Timeout(Duration),
    #[error("Media prober exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("Unreadable media prober output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("Invalid duration reported: {0}")]
    InvalidDuration(String),
}

/// Measures the playback duration of a stored media file
#[async_trait::async_trait]
pub trait DurationProber {
    /// Duration in seconds, never negative. A file without a duration
    /// reports zero.
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}
