//! Text-generation error types and retry classification.

/// Text-generation failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TextGenErrorKind {
    /// API key not found in the environment
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),
    /// Failed to build the HTTP client
    #[display("Failed to create text client: {}", _0)]
    ClientCreation(String),
    /// The request never produced an HTTP response
    #[display("Text API request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The response decoded but carried no text
    #[display("Model returned no text")]
    EmptyResponse,
    /// The response body could not be decoded
    #[display("Failed to decode text response: {}", _0)]
    Decode(String),
    /// A session method was called before `start` or after `close`
    #[display("Story session is not active")]
    SessionInactive,
}

impl TextGenErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            TextGenErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            TextGenErrorKind::ApiRequest(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            TextGenErrorKind::HttpError { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 3, 30),
            },
            TextGenErrorKind::ApiRequest(_) => (1000, 3, 10),
            _ => (2000, 3, 30),
        }
    }
}

/// Text-generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{TextGenError, TextGenErrorKind};
///
/// let err = TextGenError::new(TextGenErrorKind::MissingApiKey("GEMINI_API_KEY".into()));
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Text Error: {} at line {} in {}", kind, line, file)]
pub struct TextGenError {
    /// The kind of error that occurred
    pub kind: TextGenErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TextGenError {
    /// Create a new TextGenError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TextGenErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Errors that know whether and how they should be retried.
///
/// # Examples
///
/// ```
/// use storyreel_error::{RetryableError, TextGenError, TextGenErrorKind};
///
/// let err = TextGenError::new(TextGenErrorKind::HttpError {
///     status_code: 503,
///     message: "overloaded".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient failures (429, 503, dropped connections) return true;
    /// permanent ones (400, 401, undecodable bodies) return false.
    fn is_retryable(&self) -> bool;

    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 3, 30)
    }
}

impl RetryableError for TextGenError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
