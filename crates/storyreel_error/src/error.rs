//! Top-level error wrapper types.

use crate::{
    ConfigError, ImageGenError, MediaError, NarrationError, PipelineError, TextGenError,
};

/// Every error the workspace can produce.
///
/// # Examples
///
/// ```
/// use storyreel_error::{StoryreelError, StoryreelErrorKind, MediaError, MediaErrorKind};
///
/// let err: StoryreelError = MediaError::new(MediaErrorKind::ToolMissing("ffmpeg".into())).into();
/// assert!(matches!(err.kind(), StoryreelErrorKind::Media(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryreelErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Text-generation error
    #[from(TextGenError)]
    Text(TextGenError),
    /// Image-generation error
    #[from(ImageGenError)]
    Image(ImageGenError),
    /// Narration error
    #[from(NarrationError)]
    Narration(NarrationError),
    /// Working-file or encoder error
    #[from(MediaError)]
    Media(MediaError),
    /// Run-level error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Storyreel error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyreel Error: {}", _0)]
pub struct StoryreelError(Box<StoryreelErrorKind>);

impl StoryreelError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryreelErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryreelErrorKind {
        &self.0
    }

    /// The image-protocol kind, when this is an image error.
    pub fn image_kind(&self) -> Option<&crate::ImageGenErrorKind> {
        match self.kind() {
            StoryreelErrorKind::Image(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// The run-level kind, when this is a pipeline error.
    pub fn pipeline_kind(&self) -> Option<&crate::PipelineErrorKind> {
        match self.kind() {
            StoryreelErrorKind::Pipeline(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// True when the failure came from a cancellation token rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.image_kind(),
            Some(crate::ImageGenErrorKind::Cancelled)
        ) || matches!(
            self.pipeline_kind(),
            Some(crate::PipelineErrorKind::Cancelled)
        )
    }
}

impl<T> From<T> for StoryreelError
where
    T: Into<StoryreelErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyreel operations.
pub type StoryreelResult<T> = std::result::Result<T, StoryreelError>;
