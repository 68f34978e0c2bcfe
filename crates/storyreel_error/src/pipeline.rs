//! Pipeline-level error types.

/// Conditions that abort a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Scene rendering produced no usable frames
    #[display("Run produced no usable frames")]
    NoContent,
    /// No narration clips were available to merge
    #[display("No narration clips to merge")]
    NoAudio,
    /// Encoding or muxing the final artifact failed
    #[display("Video assembly failed: {}", _0)]
    AssemblyFailed(String),
    /// The run was abandoned by its caller
    #[display("Run cancelled")]
    Cancelled,
    /// The run request itself was unusable
    #[display("Invalid run request: {}", _0)]
    InvalidRequest(String),
    /// A text-generation step required by every later stage failed
    #[display("Story stage '{}' failed: {}", stage, message)]
    StageFailed {
        /// Stage label
        stage: String,
        /// Underlying failure
        message: String,
    },
    /// A background run task panicked or was aborted
    #[display("Run task ended abnormally: {}", _0)]
    TaskAborted(String),
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::AssemblyFailed("mux".into()));
/// assert!(err.to_string().contains("mux"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
