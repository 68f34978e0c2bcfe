//! Video assembly with the system `ffmpeg` binary.

use async_trait::async_trait;
use image::imageops::FilterType;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand, Stdio};
use std::sync::Arc;
use storyreel_config::EncodeConfig;
use storyreel_core::{FrameRate, FrameSequence, NarrationClip};
use storyreel_error::{
    MediaError, MediaErrorKind, PipelineError, PipelineErrorKind, StoryreelResult,
};
use storyreel_interface::VideoAssembler;
use tokio::process::Command;
use tokio::sync::OnceCell;

/// True when `tool -version` runs successfully.
pub async fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Round dimensions down to even values, as `yuv420p` requires.
///
/// ```
/// assert_eq!(storyreel_media::even_dimensions(1025, 768), (1024, 768));
/// assert_eq!(storyreel_media::even_dimensions(1, 1), (2, 2));
/// ```
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    let even = |v: u32| (v - v % 2).max(2);
    (even(width), even(height))
}

/// [`VideoAssembler`] backed by `ffmpeg`.
///
/// Stills are decoded with the `image` crate, resized to a common size and
/// piped to the encoder as raw RGBA, one write per output frame.
#[derive(Debug, Clone, Default)]
pub struct FfmpegAssembler {
    settings: EncodeConfig,
    ffmpeg_found: Arc<OnceCell<bool>>,
}

impl FfmpegAssembler {
    /// Create an assembler with the given encoder settings.
    pub fn new(settings: EncodeConfig) -> Self {
        Self {
            settings,
            ffmpeg_found: Arc::default(),
        }
    }

    /// Encoder settings.
    pub fn settings(&self) -> &EncodeConfig {
        &self.settings
    }

    /// Fails when the encoder binary is missing; checked once per assembler.
    async fn require_ffmpeg(&self) -> Result<(), MediaError> {
        let found = *self
            .ffmpeg_found
            .get_or_init(|| is_tool_on_path(&self.settings.ffmpeg))
            .await;
        if found {
            Ok(())
        } else {
            Err(MediaError::new(MediaErrorKind::ToolMissing(
                self.settings.ffmpeg.clone(),
            )))
        }
    }

    /// Output size: forced dimensions or the first frame's, rounded to even.
    fn target_dimensions(&self, first: &Path) -> Result<(u32, u32), MediaError> {
        if let (Some(w), Some(h)) = (self.settings.width, self.settings.height) {
            return Ok((w, h));
        }
        let (w, h) = image::image_dimensions(first).map_err(|e| {
            MediaError::new(MediaErrorKind::FileRead(format!(
                "{}: {}",
                first.display(),
                e
            )))
        })?;
        Ok(even_dimensions(w, h))
    }

    async fn run(&self, mut cmd: Command) -> Result<(), MediaError> {
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::ToolFailed {
                    tool: self.settings.ffmpeg.clone(),
                    stderr: format!("failed to spawn: {}", e),
                })
            })?;

        if !output.status.success() {
            return Err(MediaError::new(MediaErrorKind::ToolFailed {
                tool: self.settings.ffmpeg.clone(),
                stderr: format!(
                    "exited with status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }));
        }
        Ok(())
    }

    fn ffmpeg(&self) -> Command {
        let mut cmd = Command::new(&self.settings.ffmpeg);
        cmd.args(["-y", "-loglevel", "error"]);
        cmd
    }

    async fn encode_frames(
        &self,
        frames: &FrameSequence,
        rate: FrameRate,
        dest: &Path,
    ) -> Result<(), MediaError> {
        let Some(first) = frames.first_image() else {
            return Err(MediaError::new(MediaErrorKind::FileRead(
                "frame sequence is empty".to_string(),
            )));
        };
        self.require_ffmpeg().await?;
        let (width, height) = self.target_dimensions(first)?;

        let job = EncodeJob {
            ffmpeg: self.settings.ffmpeg.clone(),
            video_codec: self.settings.video_codec.clone(),
            pixel_format: self.settings.pixel_format.clone(),
            width,
            height,
            fps: rate.fps(),
            spans: frames
                .spans()
                .iter()
                .map(|s| (s.image.clone(), s.frames))
                .collect(),
            dest: dest.to_path_buf(),
        };

        tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::ToolFailed {
                    tool: self.settings.ffmpeg.clone(),
                    stderr: format!("encoder task failed: {}", e),
                })
            })?
    }

    async fn concat_audio(&self, clips: &[NarrationClip], dest: &Path) -> Result<(), MediaError> {
        self.require_ffmpeg().await?;

        let list_path = dest.with_extension("txt");
        let mut list = String::new();
        for clip in clips {
            let absolute = std::path::absolute(&clip.path).map_err(|e| {
                MediaError::new(MediaErrorKind::FileRead(format!(
                    "{}: {}",
                    clip.path.display(),
                    e
                )))
            })?;
            list.push_str(&concat_entry(&absolute));
        }
        tokio::fs::write(&list_path, list).await.map_err(|e| {
            MediaError::new(MediaErrorKind::FileWrite(format!(
                "{}: {}",
                list_path.display(),
                e
            )))
        })?;

        let mut cmd = self.ffmpeg();
        cmd.args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(dest);
        let result = self.run(cmd).await;

        if let Err(e) = tokio::fs::remove_file(&list_path).await {
            tracing::debug!(error = %e, "Could not remove concat list");
        }
        result
    }

    async fn mux_tracks(&self, video: &Path, audio: &Path, dest: &Path) -> Result<(), MediaError> {
        self.require_ffmpeg().await?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MediaError::new(MediaErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let s = &self.settings;
        let mut cmd = self.ffmpeg();
        cmd.arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(["-c:v", &s.video_codec, "-preset", &s.preset])
            .args(["-crf", &s.crf.to_string(), "-pix_fmt", &s.pixel_format])
            .args(["-c:a", &s.audio_codec, "-b:a", &s.audio_bitrate])
            .args(["-movflags", "+faststart"])
            .arg(dest);
        self.run(cmd).await
    }
}

fn assembly_failed(err: MediaError) -> PipelineError {
    PipelineError::new(PipelineErrorKind::AssemblyFailed(err.kind.to_string()))
}

/// One line of an ffmpeg concat-demuxer list.
fn concat_entry(path: &Path) -> String {
    format!(
        "file '{}'\n",
        path.to_string_lossy().replace('\'', r"'\''")
    )
}

/// Everything the blocking encoder thread needs, owned.
struct EncodeJob {
    ffmpeg: String,
    video_codec: String,
    pixel_format: String,
    width: u32,
    height: u32,
    fps: u32,
    spans: Vec<(PathBuf, u32)>,
    dest: PathBuf,
}

impl EncodeJob {
    fn run(self) -> Result<(), MediaError> {
        let tool_failed = |stderr: String| {
            MediaError::new(MediaErrorKind::ToolFailed {
                tool: self.ffmpeg.clone(),
                stderr,
            })
        };

        let mut child = StdCommand::new(&self.ffmpeg)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", &format!("{}x{}", self.width, self.height)])
            .args(["-r", &self.fps.to_string(), "-i", "pipe:0", "-an"])
            .args(["-c:v", &self.video_codec, "-pix_fmt", &self.pixel_format])
            .args(["-movflags", "+faststart"])
            .arg(&self.dest)
            .spawn()
            .map_err(|e| tool_failed(format!("failed to spawn: {}", e)))?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(tool_failed("failed to open stdin".to_string()));
        };

        let mut written = 0u64;
        for (path, frames) in &self.spans {
            let rgba = match image::open(path) {
                Ok(decoded) => decoded.to_rgba8(),
                Err(e) => {
                    drop(stdin);
                    self.abort(child);
                    return Err(MediaError::new(MediaErrorKind::FileRead(format!(
                        "{}: {}",
                        path.display(),
                        e
                    ))));
                }
            };
            let rgba = if rgba.dimensions() == (self.width, self.height) {
                rgba
            } else {
                image::imageops::resize(&rgba, self.width, self.height, FilterType::Triangle)
            };

            for _ in 0..*frames {
                if let Err(e) = stdin.write_all(rgba.as_raw()) {
                    drop(stdin);
                    let output = child.wait_with_output().ok();
                    let stderr = output
                        .map(|o| String::from_utf8_lossy(&o.stderr).trim().to_string())
                        .unwrap_or_default();
                    self.remove_partial();
                    return Err(tool_failed(format!(
                        "failed to write frame {}: {} {}",
                        written, e, stderr
                    )));
                }
                written += 1;
            }
        }
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| tool_failed(format!("failed to wait: {}", e)))?;
        if !output.status.success() {
            return Err(tool_failed(format!(
                "exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::debug!(frames = written, dest = %self.dest.display(), "Encoded silent video");
        Ok(())
    }

    /// Stop a half-fed encoder, reap it and remove its partial output.
    fn abort(&self, mut child: Child) {
        if let Err(e) = child.kill() {
            tracing::debug!(error = %e, "Encoder already exited");
        }
        if let Err(e) = child.wait() {
            tracing::warn!(error = %e, "Failed to reap encoder");
        }
        self.remove_partial();
    }

    fn remove_partial(&self) {
        match std::fs::remove_file(&self.dest) {
            Ok(()) => tracing::debug!(dest = %self.dest.display(), "Removed partial video"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove partial video"),
        }
    }
}

#[async_trait]
impl VideoAssembler for FfmpegAssembler {
    #[tracing::instrument(skip(self, frames), fields(spans = frames.spans().len(), total_frames = frames.total_frames()))]
    async fn frames_to_video(
        &self,
        frames: &FrameSequence,
        rate: FrameRate,
        dest: &Path,
    ) -> StoryreelResult<()> {
        if frames.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoContent).into());
        }
        self.encode_frames(frames, rate, dest)
            .await
            .map_err(assembly_failed)?;
        tracing::info!(dest = %dest.display(), "Silent video written");
        Ok(())
    }

    #[tracing::instrument(skip(self, clips), fields(clips = clips.len()))]
    async fn merge_audio_clips(
        &self,
        clips: &[NarrationClip],
        dest: &Path,
    ) -> StoryreelResult<()> {
        if clips.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoAudio).into());
        }
        self.concat_audio(clips, dest)
            .await
            .map_err(assembly_failed)?;
        tracing::info!(dest = %dest.display(), "Narration merged");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn mux(&self, video: &Path, audio: &Path, dest: &Path) -> StoryreelResult<()> {
        self.mux_tracks(video, audio, dest)
            .await
            .map_err(assembly_failed)?;
        tracing::info!(dest = %dest.display(), "Final video written");
        Ok(())
    }
}
