//! Wiring of the production clients.

use std::sync::Arc;
use storyreel_config::StoryreelConfig;
use storyreel_error::StoryreelResult;
use storyreel_media::FfmpegAssembler;
use storyreel_models::{BriaImageClient, GeminiClient, GoogleTtsNarrator};
use storyreel_pipeline::PipelineServices;

/// Build Gemini, Bria, TTS and ffmpeg services from configuration.
///
/// # Errors
///
/// Fails when an API key environment variable is unset or an HTTP client
/// cannot be built.
#[tracing::instrument(skip_all)]
pub fn services_from_config(config: &StoryreelConfig) -> StoryreelResult<PipelineServices> {
    let text = GeminiClient::from_config(&config.text)?;
    let images = BriaImageClient::from_config(&config.image)?;
    let narrator = GoogleTtsNarrator::from_config(&config.narration, &config.encode)?;
    let assembler = FfmpegAssembler::new(config.encode.clone());

    tracing::debug!(
        model = %config.text.model,
        image_endpoint = %config.image.endpoint,
        "Services configured"
    );
    Ok(PipelineServices {
        text: Arc::new(text),
        images: Arc::new(images),
        narrator: Arc::new(narrator),
        assembler: Arc::new(assembler),
    })
}
