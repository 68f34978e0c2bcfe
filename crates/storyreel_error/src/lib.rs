//! Error types for the Storyreel pipeline.
//!
//! Every concern gets the same shape:
//! - a `*ErrorKind` enum naming the specific condition
//! - a `*Error` struct wrapping the kind with source location tracking
//! - `#[track_caller]` constructors so the location is captured automatically
//!
//! All of them convert into [`StoryreelError`] through `?`.
//!
//! # Examples
//!
//! ```
//! use storyreel_error::{PipelineError, PipelineErrorKind, StoryreelResult};
//!
//! fn assemble() -> StoryreelResult<()> {
//!     Err(PipelineError::new(PipelineErrorKind::NoContent))?
//! }
//!
//! let err = assemble().unwrap_err();
//! assert!(err.to_string().contains("no usable frames"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod image;
mod media;
mod narration;
mod pipeline;
mod text;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{StoryreelError, StoryreelErrorKind, StoryreelResult};
pub use image::{ImageGenError, ImageGenErrorKind};
pub use media::{MediaError, MediaErrorKind};
pub use narration::{NarrationError, NarrationErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use text::{RetryableError, TextGenError, TextGenErrorKind};
