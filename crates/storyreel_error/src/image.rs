//! Image generation error types.

/// Failure conditions of the submit/poll image protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ImageGenErrorKind {
    /// Every submission attempt failed at the transport level
    #[display("Submission failed after {} attempts: {}", attempts, message)]
    SubmissionFailed {
        /// Number of submission attempts made
        attempts: u32,
        /// Message of the last failure
        message: String,
    },
    /// A single request to the image service failed
    #[display("Image service request failed: {}", _0)]
    Transport(String),
    /// The remote service reported an explicit failure status
    #[display("Image generation failed: {}", _0)]
    GenerationFailed(String),
    /// The poll budget ran out before a terminal status arrived
    #[display("Image generation timed out after {} polls", attempts)]
    Timeout {
        /// Number of polls performed
        attempts: u32,
    },
    /// The response did not have any recognised shape
    #[display("Malformed image service response: {}", _0)]
    MalformedResponse(String),
    /// The job was abandoned through its cancellation token
    #[display("Image generation cancelled")]
    Cancelled,
    /// The finished image could not be fetched or written locally
    #[display("Image download failed: {}", _0)]
    Download(String),
    /// Every prompt variant for a character portrait was rejected
    #[display("All {} portrait prompts failed for '{}'", attempts, character)]
    PortraitExhausted {
        /// Character whose portrait was requested
        character: String,
        /// Number of prompt variants tried
        attempts: u32,
    },
}

/// Image generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ImageGenError, ImageGenErrorKind};
///
/// let err = ImageGenError::new(ImageGenErrorKind::Timeout { attempts: 18 });
/// assert!(err.to_string().contains("18 polls"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Image Error: {} at line {} in {}", kind, line, file)]
pub struct ImageGenError {
    /// The kind of error that occurred
    pub kind: ImageGenErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ImageGenError {
    /// Create a new ImageGenError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ImageGenErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
