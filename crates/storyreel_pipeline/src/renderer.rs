//! Per-scene rendering.

use crate::registry::CharacterRegistry;
use crate::session::StorySession;
use std::path::Path;
use std::sync::Arc;
use storyreel_core::{FrameRate, ImageJob, Scene};
use storyreel_error::StoryreelResult;
use storyreel_interface::{ImageGenerator, NarrationSynthesizer};
use storyreel_media::RunWorkspace;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Narration spoken over a scene that has none.
pub const EMPTY_NARRATION: &str = "The scene continues.";

/// Run state a scene render reads from.
pub struct RenderContext<'a> {
    /// Story conversation, for prompt rewriting and character selection
    pub session: &'a mut StorySession,
    /// Registered characters
    pub registry: &'a CharacterRegistry,
    /// Working-file namespace
    pub workspace: &'a RunWorkspace,
    /// Run cancellation
    pub cancel: &'a CancellationToken,
}

/// Renders one scene into a narration clip and a still image.
#[derive(Clone)]
pub struct SceneRenderer {
    images: Arc<dyn ImageGenerator>,
    narrator: Arc<dyn NarrationSynthesizer>,
    frame_rate: FrameRate,
}

impl SceneRenderer {
    /// Create a renderer.
    pub fn new(
        images: Arc<dyn ImageGenerator>,
        narrator: Arc<dyn NarrationSynthesizer>,
        frame_rate: FrameRate,
    ) -> Self {
        Self {
            images,
            narrator,
            frame_rate,
        }
    }

    /// Render `scene` in place.
    ///
    /// Narration comes first because its length decides the frame count; a
    /// scene whose narration rounds to zero frames gets no image at all.
    /// When the scene names registered characters, the most prominent one's
    /// portrait guides the image, falling back to a prompt-only render on any
    /// failure.
    ///
    /// # Errors
    ///
    /// Narration, prompt-only image generation, download and cancellation
    /// failures are returned; the caller decides whether they are fatal.
    #[instrument(skip_all, fields(scene = scene.index))]
    pub async fn render(
        &self,
        scene: &mut Scene,
        ctx: &mut RenderContext<'_>,
    ) -> StoryreelResult<()> {
        let narration = if scene.narration.trim().is_empty() {
            EMPTY_NARRATION
        } else {
            scene.narration.as_str()
        };
        let clip_path = ctx.workspace.narration_path(scene.index);
        let clip = self.narrator.synthesize(narration, &clip_path).await?;
        scene.frame_count = self.frame_rate.frames_for(clip.duration);
        debug!(
            seconds = clip.duration.as_secs_f64(),
            frames = scene.frame_count,
            "Narration ready"
        );
        scene.narration_clip = Some(clip);

        if scene.frame_count == 0 {
            warn!("Narration rounds to zero frames, scene contributes nothing");
            return Ok(());
        }

        let prompt = ctx.session.image_prompt(&scene.description).await;
        let job = ImageJob::scene(prompt);

        let candidates: Vec<String> = ctx
            .registry
            .resolve(&scene.characters)
            .into_iter()
            .map(|c| c.name().clone())
            .collect();
        let chosen = ctx
            .session
            .select_character(&scene.description, &candidates)
            .await
            .and_then(|name| ctx.registry.get(&name));

        let image_path = ctx.workspace.scene_image_path(scene.index);
        let url = match chosen {
            Some(character) => {
                let reference = character.reference_url().to_string();
                debug!(character = %character.name(), "Rendering with character reference");
                let guided = job.clone().with_reference(&reference);
                match self.fetch_image(&guided, &image_path, ctx.cancel).await {
                    Ok(url) => {
                        scene.reference_url = Some(reference);
                        url
                    }
                    Err(e) if e.is_cancelled() => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "Reference render failed, falling back to prompt only");
                        self.fetch_image(&job.without_references(), &image_path, ctx.cancel)
                            .await?
                    }
                }
            }
            None => self.fetch_image(&job, &image_path, ctx.cancel).await?,
        };
        scene.image = Some(image_path);
        scene.image_url = Some(url);

        info!(frames = scene.frame_count, reference = scene.reference_url.is_some(), "Scene rendered");
        Ok(())
    }

    /// Generate `job` and download the result to `dest`.
    async fn fetch_image(
        &self,
        job: &ImageJob,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> StoryreelResult<String> {
        let url = self.images.generate(job, cancel).await?;
        self.images.download(&url, dest).await?;
        Ok(url)
    }
}
