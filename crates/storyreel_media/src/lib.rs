//! Working files and media assembly for Storyreel runs.
//!
//! [`RunWorkspace`] owns the naming and lifetime of every intermediate file a
//! run produces. [`FfmpegAssembler`] turns the rendered stills and narration
//! clips into the final video using the system `ffmpeg` binary, and
//! [`probe_duration`] measures clips with `ffprobe`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ffmpeg;
mod probe;
mod workspace;

pub use ffmpeg::{FfmpegAssembler, even_dimensions, is_tool_on_path};
pub use probe::probe_duration;
pub use workspace::{RunWorkspace, slugify};
