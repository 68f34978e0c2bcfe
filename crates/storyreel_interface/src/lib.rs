//! Trait definitions for the Storyreel pipeline.
//!
//! Every external capability the pipeline depends on sits behind one of these
//! traits, so the orchestration logic can be driven by real clients in
//! production and by scripted mocks in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod progress;
mod recorder;
mod traits;

pub use progress::{NoopProgressSink, ProgressSink};
pub use recorder::{RunOutcome, RunRecorder};
pub use traits::{ImageGenerator, NarrationSynthesizer, TextGenerator, VideoAssembler};
