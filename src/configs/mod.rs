use std::time::Duration;
use validator::Validate;

use crate::{
    api::error,
    constants::Env,
    modules::file_upload::{model::UploadConfig, FfprobeProber},
};

/// Build the upload policy from the environment, rooted at an absolute directory
pub fn upload_config(env: &Env) -> Result<UploadConfig, error::SystemError> {
    let config = UploadConfig {
        upload_dir: std::path::absolute(&env.upload_dir)?,
        base_url: env.upload_base_url.clone(),
        allowed_extensions: env.allowed_extensions.clone(),
        max_image_size: env.max_image_size,
        max_video_size: env.max_video_size,
        max_video_duration: env.max_video_duration,
    };
    config.validate()?;
    Ok(config)
}

pub fn duration_prober(env: &Env) -> FfprobeProber {
    FfprobeProber::new(env.ffprobe_path.clone(), Duration::from_secs(env.probe_timeout_secs))
}
