use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::modules::file_upload::prober::{DurationProber, ProbeError};

/// Duration prober backed by the `ffprobe` binary
#[derive(Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<serde_json::Value>,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self { ffprobe_path: ffprobe_path.into(), timeout }
    }
}

/// Read `format.duration` out of `ffprobe -print_format json` output.
fn parse_duration(stdout: &[u8]) -> Result<f64, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    let duration = match output.format.and_then(|f| f.duration) {
        None | Some(serde_json::Value::Null) => return Ok(0.0),
        Some(serde_json::Value::String(raw)) if raw == "N/A" => return Ok(0.0),
        Some(serde_json::Value::String(raw)) => {
            raw.trim().parse::<f64>().map_err(|_| ProbeError::InvalidDuration(raw))?
        }
        Some(serde_json::Value::Number(n)) => {
            n.as_f64().ok_or_else(|| ProbeError::InvalidDuration(n.to_string()))?
        }
        Some(other) => return Err(ProbeError::InvalidDuration(other.to_string())),
    };

    if !duration.is_finite() || duration < 0.0 {
        return Err(ProbeError::InvalidDuration(duration.to_string()));
    }

    Ok(duration)
}

#[async_trait::async_trait]
impl DurationProber for FfprobeProber {
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_duration(&output.stdout)
    }
}
