//! Scenes as planned by the model and as rendered by the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One scene as returned by story decomposition.
///
/// Missing fields are tolerated: an absent narration falls back to the
/// description and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePlan {
    /// Visual description
    #[serde(default)]
    pub description: String,
    /// Names of characters appearing in the scene
    #[serde(default)]
    pub characters: Vec<String>,
    /// Text read aloud over the scene
    #[serde(default)]
    pub narration: String,
}

impl ScenePlan {
    /// Scene whose description and narration are both `text`.
    pub fn from_sentence(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            description: text.clone(),
            characters: Vec::new(),
            narration: text,
        }
    }

    /// Fill an empty description from the narration and vice versa.
    pub fn normalized(mut self) -> Self {
        if self.narration.trim().is_empty() {
            self.narration = self.description.clone();
        }
        if self.description.trim().is_empty() {
            self.description = self.narration.clone();
        }
        self
    }

    /// True when neither field carries any text.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty() && self.narration.trim().is_empty()
    }
}

/// A synthesized narration clip on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationClip {
    /// Audio file
    pub path: PathBuf,
    /// Measured playback length
    pub duration: Duration,
}

impl NarrationClip {
    /// Create a clip record.
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

/// A scene moving through rendering.
///
/// Starts from a [`ScenePlan`]; rendering fills in the image, the narration
/// clip and the frame count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Zero-based position in the story
    pub index: usize,
    /// Visual description
    pub description: String,
    /// Text read aloud over the scene
    pub narration: String,
    /// Names of characters appearing in the scene
    pub characters: Vec<String>,
    /// Rendered still image
    pub image: Option<PathBuf>,
    /// Remote URL of the rendered image
    pub image_url: Option<String>,
    /// Portrait URL used as reference, if any
    pub reference_url: Option<String>,
    /// Synthesized narration
    pub narration_clip: Option<NarrationClip>,
    /// Frames the still is held for
    pub frame_count: u32,
}

impl Scene {
    /// Build an unrendered scene from a plan.
    pub fn from_plan(index: usize, plan: ScenePlan) -> Self {
        let plan = plan.normalized();
        Self {
            index,
            description: plan.description,
            narration: plan.narration,
            characters: plan.characters,
            image: None,
            image_url: None,
            reference_url: None,
            narration_clip: None,
            frame_count: 0,
        }
    }

    /// True once both an image and a non-empty frame count exist.
    pub fn contributes_frames(&self) -> bool {
        self.image.is_some() && self.frame_count > 0
    }
}
