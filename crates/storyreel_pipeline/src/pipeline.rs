//! Run orchestration.

use crate::portraits::generate_portrait;
use crate::progress::{ProgressTracker, WatchProgressSink};
use crate::registry::CharacterRegistry;
use crate::renderer::{RenderContext, SceneRenderer};
use crate::session::{StorySession, generate_story};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storyreel_config::StoryreelConfig;
use storyreel_core::{
    CharacterSpec, FrameRate, FrameSequence, NarrationClip, ProgressUpdate, RetryPolicy, RunId,
    RunRequest, RunStatus, Scene, ScenePlan, SourceKind, Stage,
};
use storyreel_error::{PipelineError, PipelineErrorKind, StoryreelError, StoryreelResult};
use storyreel_interface::{
    ImageGenerator, NarrationSynthesizer, ProgressSink, RunOutcome, RunRecorder, TextGenerator,
    VideoAssembler,
};
use storyreel_media::RunWorkspace;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

/// Remote capabilities a run drives.
#[derive(Clone)]
pub struct PipelineServices {
    /// Story conversation and prompt rewriting
    pub text: Arc<dyn TextGenerator>,
    /// Portrait and scene stills
    pub images: Arc<dyn ImageGenerator>,
    /// Spoken narration
    pub narrator: Arc<dyn NarrationSynthesizer>,
    /// Final encoding
    pub assembler: Arc<dyn VideoAssembler>,
}

/// Run-level knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Output frame rate
    pub frame_rate: FrameRate,
    /// Per-run working files
    pub work_dir: PathBuf,
    /// Finished videos
    pub output_dir: PathBuf,
    /// Pause between consecutive remote calls
    pub pacing: Duration,
    /// Portrait prompt fallback policy
    pub portrait: RetryPolicy,
}

impl PipelineSettings {
    /// Settings taken from a loaded configuration.
    pub fn from_config(config: &StoryreelConfig) -> Self {
        Self {
            frame_rate: config.pipeline.frame_rate,
            work_dir: config.pipeline.work_dir.clone(),
            output_dir: config.pipeline.output_dir.clone(),
            pacing: config.pipeline.pacing(),
            portrait: config.image.portrait,
        }
    }

    /// Settings rooted at `base`, without pacing.
    pub fn in_dir(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            frame_rate: FrameRate::DEFAULT,
            work_dir: base.join("temp"),
            output_dir: base.join("outputs"),
            pacing: Duration::ZERO,
            portrait: RetryPolicy::PORTRAIT,
        }
    }

    /// Replace the pacing pause.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Turns a prompt or a story into a narrated video.
///
/// One run is a single sequential task. Runs share nothing but the services,
/// so any number may execute concurrently.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use storyreel_pipeline::{Pipeline, PipelineServices, PipelineSettings, LogProgressSink};
/// # async fn example(services: PipelineServices) -> storyreel_error::StoryreelResult<()> {
/// let pipeline = Pipeline::new(services, PipelineSettings::in_dir("."));
/// let video = pipeline
///     .run_pipeline("A fox learns to fly", false, None, Arc::new(LogProgressSink))
///     .await?;
/// println!("{}", video.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    services: PipelineServices,
    settings: PipelineSettings,
    renderer: SceneRenderer,
    recorder: Option<Arc<dyn RunRecorder>>,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(services: PipelineServices, settings: PipelineSettings) -> Self {
        let renderer = SceneRenderer::new(
            Arc::clone(&services.images),
            Arc::clone(&services.narrator),
            settings.frame_rate,
        );
        Self {
            services,
            settings,
            renderer,
            recorder: None,
        }
    }

    /// Report run starts and outcomes to `recorder`.
    pub fn with_recorder(mut self, recorder: Arc<dyn RunRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Run-level knobs.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run from raw inputs, generating a run id when none is given.
    pub async fn run_pipeline(
        &self,
        source_text: &str,
        is_full_story: bool,
        run_id: Option<RunId>,
        progress: Arc<dyn ProgressSink>,
    ) -> StoryreelResult<PathBuf> {
        let mut request = RunRequest::new(source_text, SourceKind::from_full_story(is_full_story));
        if let Some(run_id) = run_id {
            request = request.with_run_id(run_id);
        }
        self.run(&request, progress, CancellationToken::new()).await
    }

    /// Execute one run to completion and return the artifact path.
    ///
    /// The recorder sees the start and the terminal outcome; its failures are
    /// logged and never change the result.
    ///
    /// # Errors
    ///
    /// Any pipeline-level failure, including [`PipelineErrorKind::Cancelled`]
    /// once `cancel` fires.
    #[instrument(skip_all, fields(run_id = %request.run_id, source = %request.source_kind))]
    pub async fn run(
        &self,
        request: &RunRequest,
        progress: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> StoryreelResult<PathBuf> {
        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record_started(request).await {
                warn!(error = %e, "Failed to record run start");
            }
        }

        let result = self.execute(request, progress, &cancel).await;

        let outcome = match &result {
            Ok(path) => RunOutcome::completed(path.clone()),
            Err(e) if e.is_cancelled() => RunOutcome::failed(RunStatus::Cancelled, e.to_string()),
            Err(e) => RunOutcome::failed(RunStatus::Failed, e.to_string()),
        };
        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record_finished(request, &outcome).await {
                warn!(error = %e, "Failed to record run outcome");
            }
        }

        result
    }

    /// Start a run in the background.
    pub fn spawn(self: &Arc<Self>, request: RunRequest) -> RunHandle {
        let initial = match request.source_kind {
            SourceKind::Prompt => Stage::GeneratingStory,
            SourceKind::Story => Stage::Initializing,
        };
        let (sink, progress) = WatchProgressSink::channel(ProgressUpdate::at(initial));
        let cancel = CancellationToken::new();
        let run_id = request.run_id.clone();

        let pipeline = Arc::clone(self);
        let token = cancel.clone();
        let span = info_span!("background_run", run_id = %run_id);
        let task = tokio::spawn(
            async move { pipeline.run(&request, Arc::new(sink), token).await }.instrument(span),
        );

        info!(run_id = %run_id, "Spawned background run");
        RunHandle {
            run_id,
            progress,
            cancel,
            task,
        }
    }

    async fn execute(
        &self,
        request: &RunRequest,
        progress: Arc<dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> StoryreelResult<PathBuf> {
        let mut tracker = ProgressTracker::new(progress);

        if request.source_text.trim().is_empty() {
            let err: StoryreelError = PipelineError::new(PipelineErrorKind::InvalidRequest(
                "source text is empty".to_string(),
            ))
            .into();
            tracker.fail(&err);
            return Err(err);
        }

        let workspace = match RunWorkspace::create(
            &self.settings.work_dir,
            &self.settings.output_dir,
            request.run_id.clone(),
        ) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracker.fail(&e);
                return Err(e);
            }
        };

        let result = self.drive(request, &workspace, &mut tracker, cancel).await;

        match &result {
            Ok(path) => {
                workspace.cleanup().await;
                info!(artifact = %path.display(), "Run completed");
            }
            Err(e) => {
                if e.is_cancelled() {
                    warn!("Run cancelled");
                } else {
                    error!(stage = %tracker.stage(), error = %e, "Run failed");
                }
                tracker.fail(e);
                workspace.cleanup().await;
                let artifact = workspace.artifact_path();
                match tokio::fs::remove_file(&artifact).await {
                    Ok(()) => debug!(artifact = %artifact.display(), "Removed partial artifact"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!(error = %e, "Failed to remove partial artifact"),
                }
            }
        }
        result
    }

    async fn drive(
        &self,
        request: &RunRequest,
        workspace: &RunWorkspace,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> StoryreelResult<PathBuf> {
        let story = match request.source_kind {
            SourceKind::Story => request.source_text.clone(),
            SourceKind::Prompt => {
                tracker.enter(Stage::GeneratingStory);
                let story = with_cancel(
                    cancel,
                    generate_story(self.services.text.as_ref(), &request.source_text),
                )
                .await?
                .map_err(|e| stage_failed(Stage::GeneratingStory, e))?;
                self.pause(cancel).await?;
                story
            }
        };

        tracker.enter(Stage::Initializing);
        let mut session = with_cancel(
            cancel,
            StorySession::start(Arc::clone(&self.services.text), story),
        )
        .await?
        .map_err(|e| stage_failed(Stage::Initializing, e))?;

        let result = self.run_session(&mut session, workspace, tracker, cancel).await;
        session.close();
        result
    }

    async fn run_session(
        &self,
        session: &mut StorySession,
        workspace: &RunWorkspace,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> StoryreelResult<PathBuf> {
        self.pause(cancel).await?;
        tracker.enter(Stage::IdentifyingCharacters);
        let specs = with_cancel(cancel, session.identify_characters()).await?;
        info!(count = specs.len(), "Identified characters");

        self.pause(cancel).await?;
        tracker.enter(Stage::GeneratingCharacterPortraits);
        let registry = self.generate_portraits(&specs, workspace, tracker, cancel).await?;

        checkpoint(cancel)?;
        tracker.enter(Stage::DecomposingScenes);
        let names: Vec<String> = specs.iter().map(|s| s.name.clone()).collect();
        let plans = with_cancel(cancel, session.decompose_scenes(&names)).await?;
        info!(count = plans.len(), "Decomposed story into scenes");

        let (frames, clips) = self
            .render_scenes(plans, session, &registry, workspace, tracker, cancel)
            .await?;
        if frames.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoContent).into());
        }

        checkpoint(cancel)?;
        tracker.enter(Stage::AssemblingVideo);
        let silent = workspace.silent_video_path();
        self.services
            .assembler
            .frames_to_video(&frames, self.settings.frame_rate, &silent)
            .await?;

        checkpoint(cancel)?;
        tracker.enter(Stage::MixingAudio);
        let merged = workspace.merged_audio_path();
        self.services
            .assembler
            .merge_audio_clips(&clips, &merged)
            .await?;

        checkpoint(cancel)?;
        tracker.enter(Stage::Finalizing);
        let artifact = workspace.artifact_path();
        self.services
            .assembler
            .mux(&silent, &merged, &artifact)
            .await?;

        tracker.enter(Stage::Done);
        Ok(artifact)
    }

    async fn generate_portraits(
        &self,
        specs: &[CharacterSpec],
        workspace: &RunWorkspace,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> StoryreelResult<CharacterRegistry> {
        let mut registry = CharacterRegistry::new();
        let total = specs.len();

        for (i, spec) in specs.iter().enumerate() {
            checkpoint(cancel)?;
            if registry.get(&spec.name).is_some() {
                debug!(character = %spec.name, "Portrait already generated");
                continue;
            }
            if i > 0 {
                self.pause(cancel).await?;
            }

            match generate_portrait(
                self.services.images.as_ref(),
                i,
                spec,
                workspace,
                self.settings.portrait,
                cancel,
            )
            .await
            {
                Ok(character) => {
                    registry.store(character);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    warn!(character = %spec.name, error = %e, "Continuing without portrait");
                }
            }
            tracker.report(
                Stage::GeneratingCharacterPortraits,
                Stage::GeneratingCharacterPortraits.fraction_at(i + 1, total),
                format!("Generated {}", spec.name),
            );
        }

        info!(portraits = registry.len(), requested = total, "Portraits ready");
        Ok(registry)
    }

    async fn render_scenes(
        &self,
        plans: Vec<ScenePlan>,
        session: &mut StorySession,
        registry: &CharacterRegistry,
        workspace: &RunWorkspace,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> StoryreelResult<(FrameSequence, Vec<NarrationClip>)> {
        let total = plans.len();
        let mut frames = FrameSequence::new();
        let mut clips = Vec::new();

        for (i, plan) in plans.into_iter().enumerate() {
            checkpoint(cancel)?;
            if i > 0 {
                self.pause(cancel).await?;
            }
            tracker.report(
                Stage::RenderingScenes,
                Stage::RenderingScenes.fraction_at(i, total),
                format!("Processing scene {}/{}...", i + 1, total),
            );

            let mut scene = Scene::from_plan(i, plan);
            let mut ctx = RenderContext {
                session: &mut *session,
                registry,
                workspace,
                cancel,
            };
            let rendered = with_cancel(cancel, self.renderer.render(&mut scene, &mut ctx))
                .instrument(info_span!("scene", index = i))
                .await?;

            match rendered {
                Ok(()) => {
                    if let (true, Some(image), Some(clip)) = (
                        scene.contributes_frames(),
                        scene.image.clone(),
                        scene.narration_clip.clone(),
                    ) {
                        frames.push(image, scene.frame_count);
                        clips.push(clip);
                    }
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => warn!(scene = i, error = %e, "Skipping scene"),
            }
        }

        tracker.report(
            Stage::RenderingScenes,
            Stage::RenderingScenes.end(),
            format!("Rendered {}/{} scenes", clips.len(), total),
        );
        Ok((frames, clips))
    }

    async fn pause(&self, cancel: &CancellationToken) -> StoryreelResult<()> {
        if self.settings.pacing.is_zero() {
            return checkpoint(cancel);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled()),
            _ = tokio::time::sleep(self.settings.pacing) => Ok(()),
        }
    }
}

/// A run executing in the background.
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    progress: watch::Receiver<ProgressUpdate>,
    cancel: CancellationToken,
    task: JoinHandle<StoryreelResult<PathBuf>>,
}

impl RunHandle {
    /// Id of the run.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Receiver of the latest progress update.
    pub fn progress(&self) -> watch::Receiver<ProgressUpdate> {
        self.progress.clone()
    }

    /// Ask the run to stop at its next boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run's result.
    ///
    /// # Errors
    ///
    /// The run's own error, or [`PipelineErrorKind::TaskAborted`] if the task
    /// panicked.
    pub async fn wait(self) -> StoryreelResult<PathBuf> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(PipelineError::new(PipelineErrorKind::TaskAborted(e.to_string())).into()),
        }
    }
}

fn cancelled() -> StoryreelError {
    PipelineError::new(PipelineErrorKind::Cancelled).into()
}

fn checkpoint(cancel: &CancellationToken) -> StoryreelResult<()> {
    if cancel.is_cancelled() {
        Err(cancelled())
    } else {
        Ok(())
    }
}

/// Race `fut` against cancellation.
async fn with_cancel<F: Future>(cancel: &CancellationToken, fut: F) -> StoryreelResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled()),
        out = fut => Ok(out),
    }
}

fn stage_failed(stage: Stage, err: StoryreelError) -> StoryreelError {
    if err.is_cancelled() {
        return err;
    }
    PipelineError::new(PipelineErrorKind::StageFailed {
        stage: stage.to_string(),
        message: err.to_string(),
    })
    .into()
}
