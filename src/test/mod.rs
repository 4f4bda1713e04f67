use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::modules::file_upload::{
    model::UploadConfig,
    prober::{DurationProber, ProbeError},
    service::FileUploadService,
};

/// Prober returning a fixed duration, or failing like a missing ffprobe
pub struct FakeProber {
    duration: Option<f64>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn with_duration(seconds: f64) -> Self {
        Self { duration: Some(seconds), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { duration: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DurationProber for FakeProber {
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // probing only ever happens on a file that is already written
        assert!(path.is_file(), "probed {} before it was written", path.display());

        self.duration.ok_or_else(|| {
            ProbeError::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "ffprobe not found"))
        })
    }
}

pub fn service_in(upload_dir: &Path, prober: FakeProber) -> FileUploadService<FakeProber> {
    let config = UploadConfig { upload_dir: upload_dir.to_path_buf(), ..UploadConfig::default() };
    FileUploadService::new(Arc::new(prober), config)
}

/// Executable stand-in for ffprobe that hangs far past any test timeout
#[cfg(unix)]
pub fn hanging_prober_script(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("slow-ffprobe.sh");
    std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}
