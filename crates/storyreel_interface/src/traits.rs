//! Capability traits for the remote services and the encoder.

use async_trait::async_trait;
use std::path::Path;
use storyreel_core::{
    FrameRate, FrameSequence, GenerateRequest, GenerateResponse, ImageJob, NarrationClip,
};
use storyreel_error::StoryreelResult;
use tokio_util::sync::CancellationToken;

/// Free-text generation from a prompt or conversation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the conversation in `req`.
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-2.0-flash").
    fn model_name(&self) -> &str;
}

/// Remote image generation.
///
/// Implementations own the whole submit/poll protocol including its retry
/// budgets; callers see a single call that either yields a result URL or a
/// terminal error.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Run `job` to completion and return the result image URL.
    ///
    /// Must return promptly with a cancellation error once `cancel` fires.
    async fn generate(&self, job: &ImageJob, cancel: &CancellationToken)
    -> StoryreelResult<String>;

    /// Fetch a finished image into `dest`.
    async fn download(&self, url: &str, dest: &Path) -> StoryreelResult<()>;

    /// Provider name (e.g., "bria").
    fn provider_name(&self) -> &'static str;
}

/// Text-to-speech.
#[async_trait]
pub trait NarrationSynthesizer: Send + Sync {
    /// Speak `text` into an audio file at `dest` and report its duration.
    async fn synthesize(&self, text: &str, dest: &Path) -> StoryreelResult<NarrationClip>;
}

/// Turns frames and clips into the final artifact.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// Encode the frame sequence as a silent video at `dest`.
    async fn frames_to_video(
        &self,
        frames: &FrameSequence,
        rate: FrameRate,
        dest: &Path,
    ) -> StoryreelResult<()>;

    /// Concatenate clips in order into one audio file at `dest`.
    async fn merge_audio_clips(&self, clips: &[NarrationClip], dest: &Path)
    -> StoryreelResult<()>;

    /// Combine a silent video and an audio track into `dest`.
    async fn mux(&self, video: &Path, audio: &Path, dest: &Path) -> StoryreelResult<()>;
}
