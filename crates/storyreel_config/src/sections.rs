//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storyreel_core::{FrameRate, RetryPolicy};
use storyreel_error::{ConfigError, ConfigErrorKind};

/// Run-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Output frame rate
    pub frame_rate: FrameRate,
    /// Directory holding per-run working files
    pub work_dir: PathBuf,
    /// Directory receiving finished videos
    pub output_dir: PathBuf,
    /// Pause between consecutive remote calls
    pub pacing_ms: u64,
}

impl PipelineConfig {
    /// Pause between consecutive remote calls.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::DEFAULT,
            work_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("outputs"),
            pacing_ms: 2000,
        }
    }
}

/// Text-generation client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// API base URL
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Image-generation client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Generation endpoint
    pub endpoint: String,
    /// Environment variable holding the API token
    pub api_token_env: String,
    /// Wait before the first submission of every job
    pub pre_submit_delay_ms: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Submission attempts
    pub submission: RetryPolicy,
    /// Status polls
    pub polling: RetryPolicy,
    /// Portrait prompt variants
    pub portrait: RetryPolicy,
}

impl ImageConfig {
    /// Wait before the first submission.
    pub fn pre_submit_delay(&self) -> Duration {
        Duration::from_millis(self.pre_submit_delay_ms)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read the API token from the configured environment variable.
    #[track_caller]
    pub fn api_token(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_token_env)
            .map_err(|_| ConfigError::new(ConfigErrorKind::MissingEnv(self.api_token_env.clone())))
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://engine.prod.bria-api.com/v2/image/generate".to_string(),
            api_token_env: "BRIA_API_TOKEN".to_string(),
            pre_submit_delay_ms: 3000,
            request_timeout_secs: 30,
            submission: RetryPolicy::SUBMISSION,
            polling: RetryPolicy::POLLING,
            portrait: RetryPolicy::PORTRAIT,
        }
    }
}

/// Narration synthesizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Speech endpoint
    pub endpoint: String,
    /// Spoken language code
    pub language: String,
    /// Longest text sent in one speech request
    pub chunk_chars: usize,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            language: "en".to_string(),
            chunk_chars: 100,
            request_timeout_secs: 30,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// ffmpeg binary
    pub ffmpeg: String,
    /// ffprobe binary
    pub ffprobe: String,
    /// Video codec
    pub video_codec: String,
    /// Encoder preset
    pub preset: String,
    /// Constant rate factor
    pub crf: u8,
    /// Output pixel format
    pub pixel_format: String,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate
    pub audio_bitrate: String,
    /// Forced output width; defaults to the first frame's
    pub width: Option<u32>,
    /// Forced output height; defaults to the first frame's
    pub height: Option<u32>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            width: None,
            height: None,
        }
    }
}
