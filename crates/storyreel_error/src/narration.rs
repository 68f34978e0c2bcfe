//! Narration synthesis error types.

/// Narration failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NarrationErrorKind {
    /// The speech service request failed
    #[display("Speech request failed: {}", _0)]
    Request(String),
    /// The speech service answered with a non-success status
    #[display("Speech service returned HTTP {}: {}", status_code, message)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body excerpt
        message: String,
    },
    /// The synthesized clip could not be written
    #[display("Failed to store narration clip: {}", _0)]
    Storage(String),
    /// The clip duration could not be measured
    #[display("Failed to measure clip duration: {}", _0)]
    Duration(String),
}

/// Narration error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narration Error: {} at line {} in {}", kind, line, file)]
pub struct NarrationError {
    /// The kind of error that occurred
    pub kind: NarrationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NarrationError {
    /// Create a new narration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
