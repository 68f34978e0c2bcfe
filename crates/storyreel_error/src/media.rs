//! Working-file and encoding error types.

/// Failures touching the run's files or the external encoder binaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MediaErrorKind {
    /// Failed to create a working or output directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read or decode a file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// A required tool (ffmpeg, ffprobe) is not installed
    #[display("Required tool not found on PATH: {}", _0)]
    ToolMissing(String),
    /// A tool ran but exited unsuccessfully
    #[display("{} failed: {}", tool, stderr)]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Captured diagnostics
        stderr: String,
    },
    /// A tool produced output that could not be interpreted
    #[display("Unexpected output from {}: {}", tool, output)]
    UnexpectedOutput {
        /// Tool name
        tool: String,
        /// The offending output
        output: String,
    },
}

/// Media error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{MediaError, MediaErrorKind};
///
/// let err = MediaError::new(MediaErrorKind::ToolMissing("ffprobe".into()));
/// assert!(err.to_string().contains("ffprobe"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
