//! Clip duration measurement.

use std::path::Path;
use std::time::Duration;
use storyreel_error::{MediaError, MediaErrorKind};
use tokio::process::Command;

/// Measure the playback length of a media file with `ffprobe`.
#[tracing::instrument(skip(ffprobe), fields(path = %path.display()))]
pub async fn probe_duration(ffprobe: &str, path: &Path) -> Result<Duration, MediaError> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::new(MediaErrorKind::ToolMissing(ffprobe.to_string()))
            } else {
                MediaError::new(MediaErrorKind::ToolFailed {
                    tool: ffprobe.to_string(),
                    stderr: e.to_string(),
                })
            }
        })?;

    if !output.status.success() {
        return Err(MediaError::new(MediaErrorKind::ToolFailed {
            tool: ffprobe.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration = parse_seconds(&stdout).ok_or_else(|| {
        MediaError::new(MediaErrorKind::UnexpectedOutput {
            tool: ffprobe.to_string(),
            output: stdout.trim().to_string(),
        })
    })?;

    tracing::debug!(seconds = duration.as_secs_f64(), "Probed duration");
    Ok(duration)
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    let seconds: f64 = raw.lines().next()?.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_seconds() {
        assert_eq!(parse_seconds("2.500000\n"), Some(Duration::from_millis(2500)));
        assert_eq!(parse_seconds("N/A\n"), None);
        assert_eq!(parse_seconds("-1.0"), None);
        assert_eq!(parse_seconds(""), None);
    }
}
