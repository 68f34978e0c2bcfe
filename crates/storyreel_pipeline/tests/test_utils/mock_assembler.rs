//! Assembler recording what it was asked to encode.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use storyreel_core::{FrameRate, FrameSequence, NarrationClip};
use storyreel_error::{MediaError, MediaErrorKind, PipelineError, PipelineErrorKind, StoryreelResult};
use storyreel_interface::VideoAssembler;

/// Writes placeholder outputs and keeps the inputs.
#[derive(Default)]
pub struct MockAssembler {
    frames: Mutex<Option<FrameSequence>>,
    clips: Mutex<Vec<NarrationClip>>,
    muxed: Mutex<Option<PathBuf>>,
}

#[allow(dead_code)]
impl MockAssembler {
    /// Frame sequence handed to the encoder.
    pub fn frames(&self) -> Option<FrameSequence> {
        self.frames.lock().unwrap().clone()
    }

    /// Clips handed to the audio merge.
    pub fn clips(&self) -> Vec<NarrationClip> {
        self.clips.lock().unwrap().clone()
    }

    /// Length of the merged audio track.
    pub fn merged_duration(&self) -> Duration {
        self.clips().iter().map(|c| c.duration).sum()
    }

    /// Artifact written by the mux step.
    pub fn muxed(&self) -> Option<PathBuf> {
        self.muxed.lock().unwrap().clone()
    }
}

async fn touch(path: &Path) -> StoryreelResult<()> {
    tokio::fs::write(path, b"fake")
        .await
        .map_err(|e| MediaError::new(MediaErrorKind::FileWrite(e.to_string())).into())
}

#[async_trait]
impl VideoAssembler for MockAssembler {
    async fn frames_to_video(
        &self,
        frames: &FrameSequence,
        _rate: FrameRate,
        dest: &Path,
    ) -> StoryreelResult<()> {
        if frames.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoContent).into());
        }
        *self.frames.lock().unwrap() = Some(frames.clone());
        touch(dest).await
    }

    async fn merge_audio_clips(&self, clips: &[NarrationClip], dest: &Path) -> StoryreelResult<()> {
        if clips.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoAudio).into());
        }
        *self.clips.lock().unwrap() = clips.to_vec();
        touch(dest).await
    }

    async fn mux(&self, _video: &Path, _audio: &Path, dest: &Path) -> StoryreelResult<()> {
        *self.muxed.lock().unwrap() = Some(dest.to_path_buf());
        touch(dest).await
    }
}
