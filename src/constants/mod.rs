pub const MB: usize = 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = ".jpg,.jpeg,.png,.gif,.mp4";
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 5 * MB;
pub const DEFAULT_MAX_VIDEO_SIZE: usize = 75 * MB;
pub const DEFAULT_MAX_VIDEO_DURATION: f64 = 16.0;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Extension (lower-cased, with the dot) that marks an upload as a video.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Longest file name most filesystems accept (NAME_MAX).
pub const MAX_STORED_NAME_BYTES: usize = 255;

/// Multipart field the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

pub struct Env {
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub upload_dir: String,
    pub upload_base_url: String,
    pub allowed_extensions: Vec<String>,
    pub max_image_size: usize,
    pub max_video_size: usize,
    pub max_video_duration: f64,
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Env {
    fn new() -> Self {
        let frontend_url = var_or("FRONTEND_URL", "http://localhost:5173");
        let ip = var_or("IP", "127.0.0.1");
        let port = var_or("PORT", "8080").parse::<u16>().expect("PORT must be a valid u16 integer");
        let workers = var_or("WORKERS", "2")
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        let upload_dir = var_or("UPLOAD_DIR", "uploads");
        let upload_base_url = var_or("UPLOAD_BASE_URL", "/api/files");

        let allowed_extensions = var_or("ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS)
            .split(',')
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
            .collect();

        let max_image_size = var_or("MAX_IMAGE_SIZE", &DEFAULT_MAX_IMAGE_SIZE.to_string())
            .parse::<usize>()
            .expect("MAX_IMAGE_SIZE must be a valid usize integer");
        let max_video_size = var_or("MAX_VIDEO_SIZE", &DEFAULT_MAX_VIDEO_SIZE.to_string())
            .parse::<usize>()
            .expect("MAX_VIDEO_SIZE must be a valid usize integer");
        let max_video_duration =
            var_or("MAX_VIDEO_DURATION", &DEFAULT_MAX_VIDEO_DURATION.to_string())
                .parse::<f64>()
                .expect("MAX_VIDEO_DURATION must be a number of seconds");

        let ffprobe_path = var_or("FFPROBE_PATH", "ffprobe");
        let probe_timeout_secs =
            var_or("PROBE_TIMEOUT_SECS", &DEFAULT_PROBE_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .expect("PROBE_TIMEOUT_SECS must be a valid u64 integer");

        Env {
            frontend_url,
            ip,
            port,
            workers,
            upload_dir,
            upload_base_url,
            allowed_extensions,
            max_image_size,
            max_video_size,
            max_video_duration,
            ffprobe_path,
            probe_timeout_secs,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
