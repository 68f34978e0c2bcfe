//! Image generation jobs.

use serde::{Deserialize, Serialize};

/// Why an image is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum ImageJobKind {
    /// Reference portrait of a character
    #[display("portrait")]
    Portrait,
    /// Still for a scene
    #[display("scene")]
    Scene,
}

/// Lifecycle of a job on the remote service.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, strum::EnumIs,
)]
pub enum ImageJobStatus {
    /// Accepted by the service
    #[display("submitted")]
    Submitted,
    /// Waiting on completion
    #[display("polling")]
    Polling,
    /// Finished with a result URL
    #[display("completed")]
    Completed(String),
    /// Terminally failed
    #[display("failed: {_0}")]
    Failed(String),
    /// Polling budget ran out before a terminal status
    #[display("timed out")]
    TimedOut,
}

impl ImageJobStatus {
    /// True once the job can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_) | Self::TimedOut)
    }
}

/// A request for one generated image.
///
/// With references present the job is image-to-image, otherwise text-to-image.
///
/// ```
/// use storyreel_core::{ImageJob, ImageJobKind};
///
/// let job = ImageJob::scene("a lighthouse at dusk")
///     .with_reference("https://cdn.example/ava.png");
/// assert_eq!(job.kind, ImageJobKind::Scene);
/// assert!(job.is_image_to_image());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageJob {
    /// Text prompt
    pub prompt: String,
    /// Reference image URLs
    pub references: Vec<String>,
    /// Portrait or scene
    pub kind: ImageJobKind,
    /// Remote status; `None` until the job reaches the service
    pub status: Option<ImageJobStatus>,
}

impl ImageJob {
    /// Text-to-image portrait job.
    pub fn portrait(prompt: impl Into<String>) -> Self {
        Self::new(prompt, ImageJobKind::Portrait)
    }

    /// Text-to-image scene job.
    pub fn scene(prompt: impl Into<String>) -> Self {
        Self::new(prompt, ImageJobKind::Scene)
    }

    fn new(prompt: impl Into<String>, kind: ImageJobKind) -> Self {
        Self {
            prompt: prompt.into(),
            references: Vec::new(),
            kind,
            status: None,
        }
    }

    /// Add a reference image URL.
    pub fn with_reference(mut self, url: impl Into<String>) -> Self {
        self.references.push(url.into());
        self
    }

    /// True when the job carries reference images.
    pub fn is_image_to_image(&self) -> bool {
        !self.references.is_empty()
    }

    /// Same job with references stripped, used for the text-to-image fallback.
    pub fn without_references(&self) -> Self {
        Self {
            references: Vec::new(),
            status: None,
            ..self.clone()
        }
    }
}
