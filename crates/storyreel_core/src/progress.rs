//! Progress reporting and run status.

use serde::{Deserialize, Serialize};

/// Pipeline stages in execution order.
///
/// Each stage owns a fixed slice of the `[0, 1]` progress range. Per-item
/// stages interpolate across their slice.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Synthesizing a story from a prompt
    #[display("generating story")]
    GeneratingStory,
    /// Opening the story session
    #[display("initializing")]
    Initializing,
    /// Extracting characters
    #[display("identifying characters")]
    IdentifyingCharacters,
    /// Generating character portraits
    #[display("generating character portraits")]
    GeneratingCharacterPortraits,
    /// Decomposing the story into scenes
    #[display("decomposing scenes")]
    DecomposingScenes,
    /// Rendering scene images and narration
    #[display("rendering scenes")]
    RenderingScenes,
    /// Encoding the silent video
    #[display("assembling video")]
    AssemblingVideo,
    /// Merging narration clips
    #[display("mixing audio")]
    MixingAudio,
    /// Muxing the final artifact
    #[display("finalizing")]
    Finalizing,
    /// Artifact ready
    #[display("done")]
    Done,
    /// Run ended without an artifact; reported at the fraction last reached
    #[display("failed")]
    Failed,
}

impl Stage {
    /// Progress fraction at which the stage begins.
    pub fn start(&self) -> f32 {
        match self {
            Stage::GeneratingStory => 0.0,
            Stage::Initializing => 0.05,
            Stage::IdentifyingCharacters => 0.10,
            Stage::GeneratingCharacterPortraits => 0.20,
            Stage::DecomposingScenes => 0.40,
            Stage::RenderingScenes => 0.40,
            Stage::AssemblingVideo => 0.85,
            Stage::MixingAudio => 0.90,
            Stage::Finalizing => 0.95,
            Stage::Done => 1.0,
            Stage::Failed => 0.0,
        }
    }

    /// Progress fraction at which the stage ends.
    pub fn end(&self) -> f32 {
        match self {
            Stage::GeneratingCharacterPortraits => 0.35,
            Stage::RenderingScenes => 0.80,
            other => other.start(),
        }
    }

    /// True for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Fraction for item `done` out of `total` within this stage's slice.
    ///
    /// ```
    /// use storyreel_core::Stage;
    ///
    /// assert_eq!(Stage::RenderingScenes.fraction_at(0, 4), 0.40);
    /// assert!((Stage::GeneratingCharacterPortraits.fraction_at(2, 2) - 0.35).abs() < 1e-6);
    /// ```
    pub fn fraction_at(&self, done: usize, total: usize) -> f32 {
        if total == 0 {
            return self.start();
        }
        let ratio = done.min(total) as f32 / total as f32;
        self.start() + (self.end() - self.start()) * ratio
    }

    /// Human-readable label shown to the caller.
    pub fn label(&self) -> String {
        match self {
            Stage::GeneratingStory => "Generating story...".to_string(),
            Stage::Initializing => "Starting session...".to_string(),
            Stage::IdentifyingCharacters => "Identifying characters...".to_string(),
            Stage::GeneratingCharacterPortraits => "Generating character images...".to_string(),
            Stage::DecomposingScenes => "Creating scenes...".to_string(),
            Stage::RenderingScenes => "Rendering scenes...".to_string(),
            Stage::AssemblingVideo => "Creating video...".to_string(),
            Stage::MixingAudio => "Adding audio...".to_string(),
            Stage::Finalizing => "Finalizing...".to_string(),
            Stage::Done => "Done!".to_string(),
            Stage::Failed => "Failed".to_string(),
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Completion in `[0, 1]`
    pub fraction: f32,
    /// Label describing the current step
    pub label: String,
    /// Stage the update belongs to
    pub stage: Stage,
}

impl ProgressUpdate {
    /// Update at the start of `stage` with its default label.
    pub fn at(stage: Stage) -> Self {
        Self {
            fraction: stage.start(),
            label: stage.label(),
            stage,
        }
    }

    /// Update with an explicit fraction and label.
    pub fn new(stage: Stage, fraction: f32, label: impl Into<String>) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            label: label.into(),
            stage,
        }
    }
}

/// Terminal or in-flight status recorded for a run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run in progress
    Processing,
    /// Artifact produced
    Completed,
    /// Run failed
    Failed,
    /// Run abandoned by its caller
    Cancelled,
}

impl RunStatus {
    /// True for every status other than `Processing`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Processing)
    }
}
